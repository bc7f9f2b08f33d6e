// src/db/document_store.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::common::error::AppError;

/// Campos de um registro: um objeto JSON com chaves camelCase.
pub type Fields = Map<String, Value>;

// Um registro como o store devolve: o que ele atribui (id, timestamps) fica fora do mapa
#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub fields: Fields,
}

impl StoredDocument {
    /// Junta os campos gerenciados pelo store e desserializa no tipo do domínio.
    pub fn into_entity<T: DeserializeOwned>(self) -> Result<T, AppError> {
        let mut fields = self.fields;
        fields.insert("id".into(), Value::String(self.id.to_string()));
        fields.insert("createdAt".into(), serde_json::to_value(self.created_at)?);
        fields.insert("updatedAt".into(), serde_json::to_value(self.updated_at)?);
        Ok(serde_json::from_value(Value::Object(fields))?)
    }
}

/// Banco de documentos: coleção / id / mapa de campos.
///
/// Cada chamada é atômica para um único registro. Não há transação entre registros.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<StoredDocument>, AppError>;

    /// Registros onde `field == value`, do mais novo para o mais antigo
    /// (empate em createdAt resolvido pela ordem de inserção).
    async fn query(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<StoredDocument>, AppError>;

    /// Grava um novo registro. O store atribui id e createdAt.
    async fn insert(&self, collection: &str, fields: Fields) -> Result<Uuid, AppError>;

    /// Merge parcial: só as chaves presentes mudam. Carimba updatedAt.
    /// Retorna false se o registro não existe.
    async fn update(&self, collection: &str, id: Uuid, fields: Fields) -> Result<bool, AppError>;

    async fn delete(&self, collection: &str, id: Uuid) -> Result<bool, AppError>;

    /// Soma `delta` a um campo inteiro numa única operação atômica.
    /// Campo ausente vale 0 e o resultado nunca fica negativo. Carimba updatedAt.
    /// Retorna None (sem criar nada) se o registro não existe.
    async fn increment(
        &self,
        collection: &str,
        id: Uuid,
        field: &str,
        delta: i64,
    ) -> Result<Option<i64>, AppError>;
}

/// Converte um payload serializável no mapa de campos que o store grava.
pub fn to_fields<T: serde::Serialize>(value: &T) -> Result<Fields, AppError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(AppError::InternalServerError(anyhow::anyhow!(
            "payload não é um objeto JSON: {}",
            other
        ))),
    }
}
