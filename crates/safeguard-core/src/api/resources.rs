//! Typed CRUD endpoints.
//!
//! Each entity names its collection path once through `Resource`; the client
//! builds `GET path`, `POST path`, `PUT path/{id}` and `DELETE path/{id}` from
//! it. All of them go through the same interceptors as any other request.

use serde::{de::DeserializeOwned, Serialize};

use crate::models::{
    Alert, AlertInput, Reading, ReadingInput, Risk, Sensor, SensorInput, Station, StationInput,
};

use super::{ApiClient, ApiError};

pub trait Resource: DeserializeOwned + Send + 'static {
    /// Collection path, relative to the base URL
    const PATH: &'static str;

    fn id(&self) -> i64;

    fn item_path(id: i64) -> String {
        format!("{}/{}", Self::PATH, id)
    }
}

/// Resources the client may create, update and delete
pub trait EditableResource: Resource {
    type Input: Serialize + Send + Sync;
}

impl Resource for Alert {
    const PATH: &'static str = "/alertas";
    fn id(&self) -> i64 {
        self.id
    }
}

impl EditableResource for Alert {
    type Input = AlertInput;
}

impl Resource for Sensor {
    const PATH: &'static str = "/sensor";
    fn id(&self) -> i64 {
        self.id
    }
}

impl EditableResource for Sensor {
    type Input = SensorInput;
}

impl Resource for Reading {
    const PATH: &'static str = "/leitura";
    fn id(&self) -> i64 {
        self.id
    }
}

impl EditableResource for Reading {
    type Input = ReadingInput;
}

impl Resource for Risk {
    const PATH: &'static str = "/riscos";
    fn id(&self) -> i64 {
        self.id
    }
}

impl Resource for Station {
    const PATH: &'static str = "/estacoes";
    fn id(&self) -> i64 {
        self.id
    }
}

impl EditableResource for Station {
    type Input = StationInput;
}

impl ApiClient {
    /// Fetch a whole collection. A `null` body is an empty list.
    pub async fn list<R: Resource>(&self) -> Result<Vec<R>, ApiError> {
        let items: Option<Vec<R>> = self.get(R::PATH).await?;
        Ok(items.unwrap_or_default())
    }

    pub async fn create<R: EditableResource>(&self, input: &R::Input) -> Result<(), ApiError> {
        self.post_unit(R::PATH, input).await
    }

    pub async fn update<R: EditableResource>(&self, id: i64, input: &R::Input) -> Result<(), ApiError> {
        self.put(&R::item_path(id), input).await
    }

    pub async fn delete<R: EditableResource>(&self, id: i64) -> Result<(), ApiError> {
        self.delete_path(&R::item_path(id)).await
    }

    /// Sensors attached to one station
    pub async fn station_sensors(&self, station_id: i64) -> Result<Vec<Sensor>, ApiError> {
        let path = format!("{}?estacaoId={}", Sensor::PATH, station_id);
        let items: Option<Vec<Sensor>> = self.get(&path).await?;
        Ok(items.unwrap_or_default())
    }
}
