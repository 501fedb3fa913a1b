use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Server-assigned identifier. The backend may hand out numbers or strings,
/// so the value is kept as-is and only ever displayed or echoed back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClientId {
    Number(i64),
    Text(String),
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientId::Number(n) => write!(f, "{}", n),
            ClientId::Text(s) => f.write_str(s),
        }
    }
}

impl FromStr for ClientId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Only canonical integers become numbers; "007" or "+5" must reach
        // the server exactly as typed.
        Ok(match s.parse::<i64>() {
            Ok(n) if n.to_string() == s => ClientId::Number(n),
            _ => ClientId::Text(s.to_string()),
        })
    }
}

/// A client record as returned by the list and create endpoints
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Client {
    pub id: ClientId,
    #[serde(rename = "nome", default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
    #[serde(rename = "telefone", default, deserialize_with = "null_as_empty")]
    pub phone: String,
    #[serde(rename = "cep", default, deserialize_with = "null_as_empty")]
    pub postal_code: String,
    #[serde(rename = "logradouro", default, deserialize_with = "null_as_empty")]
    pub street: String,
    #[serde(rename = "complemento", default, deserialize_with = "null_as_empty")]
    pub complement: String,
    #[serde(rename = "numero", default, deserialize_with = "number_as_text")]
    pub number: String,
    #[serde(rename = "bairro", default, deserialize_with = "null_as_empty")]
    pub neighborhood: String,
    #[serde(rename = "cidade", default, deserialize_with = "null_as_empty")]
    pub city: String,
    #[serde(rename = "uf", default, deserialize_with = "null_as_empty")]
    pub state: String,
    #[serde(default, deserialize_with = "truthy")]
    pub status: bool,
}

impl Client {
    pub fn is_active(&self) -> bool {
        self.status
    }
}

/// Body of a create request. The backend expects capitalized keys.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewClient {
    #[serde(rename = "Nome")]
    pub name: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Telefone")]
    pub phone: String,
    #[serde(rename = "Cep")]
    pub postal_code: String,
    #[serde(rename = "Logradouro")]
    pub street: String,
    #[serde(rename = "Complemento")]
    pub complement: String,
    #[serde(rename = "Numero")]
    pub number: Option<u32>,
    #[serde(rename = "Bairro")]
    pub neighborhood: String,
    #[serde(rename = "Cidade")]
    pub city: String,
    #[serde(rename = "Uf")]
    pub state: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

fn number_as_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Scalar>::deserialize(deserializer)? {
        Some(Scalar::Int(n)) => n.to_string(),
        Some(Scalar::Float(n)) => n.to_string(),
        Some(Scalar::Text(s)) => s,
        Some(Scalar::Bool(_)) | None => String::new(),
    })
}

// null, false, 0 and "" all read as inactive
fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Scalar>::deserialize(deserializer)? {
        Some(Scalar::Bool(b)) => b,
        Some(Scalar::Int(n)) => n != 0,
        Some(Scalar::Float(n)) => n != 0.0,
        Some(Scalar::Text(s)) => !s.is_empty(),
        None => false,
    })
}
