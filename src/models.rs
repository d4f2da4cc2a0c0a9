//! Wire payloads and their conversions to and from the stored entities.
//!
//! Request payloads keep every field optional so that a missing field is
//! reported through validation with its own message instead of a generic
//! deserialization failure.

use std::{borrow::Cow, collections::HashMap};

use sea_orm::{ActiveValue::NotSet, Set};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::entities::{address, movie, session, theater};

pub const TITLE_REQUIRED: &str = "O título do filme é obrigatório";
pub const GENRE_REQUIRED: &str = "O genero do filme é obrigatório";
pub const GENRE_TOO_LONG: &str = "O tamanho do genero não pode exceder 50 caracteres";
pub const DURATION_RANGE: &str = "A duração deve ter entre 70 e 360 minutos";

fn blank(value: &str, message: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required").with_message(Cow::Borrowed(message)));
    }
    Ok(())
}

fn title_not_blank(value: &str) -> Result<(), ValidationError> {
    blank(value, TITLE_REQUIRED)
}

fn genre_not_blank(value: &str) -> Result<(), ValidationError> {
    blank(value, GENRE_REQUIRED)
}

fn name_not_blank(value: &str) -> Result<(), ValidationError> {
    blank(value, "O campo de nome é obrigatório.")
}

fn street_not_blank(value: &str) -> Result<(), ValidationError> {
    blank(value, "O campo logradouro é obrigatório.")
}

/// Body of `POST /Filme` and `PUT /Filme/{id}`, and the working copy a patch
/// document is applied to.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct MoviePayload {
    #[serde(rename = "titulo")]
    #[validate(required(message = "O título do filme é obrigatório"), custom(function = "title_not_blank"))]
    pub title: Option<String>,
    #[serde(rename = "genero")]
    #[validate(
        required(message = "O genero do filme é obrigatório"),
        custom(function = "genre_not_blank"),
        length(max = 50, message = "O tamanho do genero não pode exceder 50 caracteres")
    )]
    pub genre: Option<String>,
    #[serde(rename = "duracao")]
    #[validate(
        required(message = "A duração deve ter entre 70 e 360 minutos"),
        range(min = 70, max = 360, message = "A duração deve ter entre 70 e 360 minutos")
    )]
    pub duration: Option<i32>,
}

/// The updatable fields of a movie once they passed validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MovieFields {
    pub title: String,
    pub genre: String,
    pub duration: i32,
}

impl TryFrom<MoviePayload> for MovieFields {
    type Error = ValidationErrors;

    fn try_from(payload: MoviePayload) -> Result<Self, Self::Error> {
        payload.validate()?;
        let (Some(title), Some(genre), Some(duration)) =
            (payload.title, payload.genre, payload.duration)
        else {
            return Err(ValidationErrors::new());
        };
        Ok(Self { title, genre, duration })
    }
}

impl From<&movie::Model> for MoviePayload {
    fn from(model: &movie::Model) -> Self {
        Self {
            title: Some(model.title.clone()),
            genre: Some(model.genre.clone()),
            duration: Some(model.duration),
        }
    }
}

impl MovieFields {
    pub fn into_active_model(self) -> movie::ActiveModel {
        movie::ActiveModel {
            id: NotSet,
            title: Set(self.title),
            genre: Set(self.genre),
            duration: Set(self.duration),
        }
    }

    pub fn apply_to(self, model: movie::Model) -> movie::ActiveModel {
        movie::ActiveModel {
            id: Set(model.id),
            ..self.into_active_model()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadSession {
    #[serde(rename = "filmeId")]
    pub movie_id: i32,
    #[serde(rename = "cinemaId")]
    pub theater_id: i32,
}

impl From<session::Model> for ReadSession {
    fn from(model: session::Model) -> Self {
        Self { movie_id: model.movie_id, theater_id: model.theater_id }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadMovie {
    pub id: i32,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "genero")]
    pub genre: String,
    #[serde(rename = "duracao")]
    pub duration: i32,
    #[serde(rename = "sessoes")]
    pub sessions: Vec<ReadSession>,
}

impl ReadMovie {
    pub fn new(model: movie::Model, sessions: Vec<session::Model>) -> Self {
        Self {
            id: model.id,
            title: model.title,
            genre: model.genre,
            duration: model.duration,
            sessions: sessions.into_iter().map(ReadSession::from).collect(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Validate)]
pub struct CreateTheater {
    #[serde(rename = "nome")]
    #[validate(required(message = "O campo de nome é obrigatório."), custom(function = "name_not_blank"))]
    pub name: Option<String>,
    #[serde(rename = "enderecoId")]
    #[validate(required(message = "O campo enderecoId é obrigatório."))]
    pub address_id: Option<i32>,
}

/// Body of `PUT /Cinema/{id}`. The address is kept when omitted.
#[derive(Clone, Debug, Default, Deserialize, Validate)]
pub struct UpdateTheater {
    #[serde(rename = "nome")]
    #[validate(required(message = "O campo de nome é obrigatório."), custom(function = "name_not_blank"))]
    pub name: Option<String>,
    #[serde(rename = "enderecoId")]
    pub address_id: Option<i32>,
}

impl CreateTheater {
    pub fn into_active_model(self) -> Result<theater::ActiveModel, ValidationErrors> {
        self.validate()?;
        let (Some(name), Some(address_id)) = (self.name, self.address_id) else {
            return Err(ValidationErrors::new());
        };
        Ok(theater::ActiveModel { id: NotSet, name: Set(name), address_id: Set(address_id) })
    }
}

impl UpdateTheater {
    pub fn apply_to(self, model: theater::Model) -> Result<theater::ActiveModel, ValidationErrors> {
        self.validate()?;
        let Some(name) = self.name else {
            return Err(ValidationErrors::new());
        };
        Ok(theater::ActiveModel {
            id: Set(model.id),
            name: Set(name),
            address_id: Set(self.address_id.unwrap_or(model.address_id)),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadTheater {
    pub id: i32,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "enderecoId")]
    pub address_id: i32,
    #[serde(rename = "sessoes")]
    pub sessions: Vec<ReadSession>,
}

impl ReadTheater {
    pub fn new(model: theater::Model, sessions: Vec<session::Model>) -> Self {
        Self {
            id: model.id,
            name: model.name,
            address_id: model.address_id,
            sessions: sessions.into_iter().map(ReadSession::from).collect(),
        }
    }
}

/// Used for both create and replace.
#[derive(Clone, Debug, Default, Deserialize, Validate)]
pub struct AddressPayload {
    #[serde(rename = "logradouro")]
    #[validate(required(message = "O campo logradouro é obrigatório."), custom(function = "street_not_blank"))]
    pub street: Option<String>,
    #[serde(rename = "numero")]
    #[validate(required(message = "O campo numero é obrigatório."))]
    pub number: Option<i32>,
}

impl AddressPayload {
    pub fn into_active_model(self) -> Result<address::ActiveModel, ValidationErrors> {
        self.validate()?;
        let (Some(street), Some(number)) = (self.street, self.number) else {
            return Err(ValidationErrors::new());
        };
        Ok(address::ActiveModel { id: NotSet, street: Set(street), number: Set(number) })
    }

    pub fn apply_to(self, model: address::Model) -> Result<address::ActiveModel, ValidationErrors> {
        Ok(address::ActiveModel { id: Set(model.id), ..self.into_active_model()? })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadAddress {
    pub id: i32,
    #[serde(rename = "logradouro")]
    pub street: String,
    #[serde(rename = "numero")]
    pub number: i32,
}

impl From<address::Model> for ReadAddress {
    fn from(model: address::Model) -> Self {
        Self { id: model.id, street: model.street, number: model.number }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Validate)]
pub struct CreateSession {
    #[serde(rename = "filmeId")]
    #[validate(required(message = "O campo filmeId é obrigatório."))]
    pub movie_id: Option<i32>,
    #[serde(rename = "cinemaId")]
    #[validate(required(message = "O campo cinemaId é obrigatório."))]
    pub theater_id: Option<i32>,
}

impl TryFrom<CreateSession> for session::Model {
    type Error = ValidationErrors;

    fn try_from(payload: CreateSession) -> Result<Self, Self::Error> {
        payload.validate()?;
        let (Some(movie_id), Some(theater_id)) = (payload.movie_id, payload.theater_id) else {
            return Err(ValidationErrors::new());
        };
        Ok(Self { movie_id, theater_id })
    }
}

/// Splits a batch of sessions by the key `key` picks out.
pub fn group_sessions(
    sessions: Vec<session::Model>,
    key: impl Fn(&session::Model) -> i32,
) -> HashMap<i32, Vec<session::Model>> {
    let mut grouped: HashMap<i32, Vec<session::Model>> = HashMap::new();
    for s in sessions {
        grouped.entry(key(&s)).or_default().push(s);
    }
    grouped
}
