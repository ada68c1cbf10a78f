use serde::{Deserialize, Serialize};

/// Entity reported when the active scene has never been saved to disk.
pub const UNSAVED_ENTITY: &str = "Unsaved Scene";
pub const ENTITY_TYPE: &str = "file";
pub const CATEGORY: &str = "designing";
pub const DEFAULT_BRANCH: &str = "master";
pub const LANGUAGE: &str = "Unity";

/// Same-entity, non-write activity inside this window is not re-sent.
pub const COOLDOWN_SECONDS: f64 = 120.0;

/// A single activity report. Built once by [`crate::builder::build`] and only
/// read afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeartBeat {
    entity: String,
    #[serde(rename = "type")]
    kind: String,
    category: String,
    time: f64,
    project: String,
    branch: String,
    language: String,
    is_write: bool,
}

impl HeartBeat {
    pub(crate) fn new(
        entity: String,
        time: f64,
        project: String,
        branch: String,
        is_write: bool,
    ) -> Self {
        HeartBeat {
            entity,
            kind: ENTITY_TYPE.to_owned(),
            category: CATEGORY.to_owned(),
            time,
            project,
            branch,
            language: LANGUAGE.to_owned(),
            is_write,
        }
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn is_write(&self) -> bool {
        self.is_write
    }
}

/// The part of an accepted heartbeat the server echoes back.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HeartBeatAck {
    pub id: String,
    pub entity: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub time: f64,
}

#[derive(Debug, Deserialize)]
struct ResponseJson {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

/// How a single heartbeat request ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    /// No response body at all; the network or the server was unreachable.
    Unreachable,
    /// The server already holds an equivalent heartbeat.
    Duplicate,
    /// The server (or its response) reported a failure.
    Rejected(String),
    Accepted(HeartBeatAck),
}

impl Delivery {
    const DUPLICATE: &'static str = "Duplicate";

    pub fn from_body(body: &str) -> Delivery {
        if body.trim().is_empty() {
            return Delivery::Unreachable;
        }

        let response: ResponseJson = match serde_json::from_str(body) {
            Ok(r) => r,
            Err(e) => return Delivery::Rejected(format!("malformed response: {}", e)),
        };

        match response.error {
            Some(e) if e == Self::DUPLICATE => Delivery::Duplicate,
            Some(e) => Delivery::Rejected(e),
            None => match response.data.map(serde_json::from_value::<HeartBeatAck>) {
                Some(Ok(ack)) => Delivery::Accepted(ack),
                Some(Err(e)) => Delivery::Rejected(format!("malformed heartbeat data: {}", e)),
                None => Delivery::Rejected("response carried neither error nor data".to_owned()),
            },
        }
    }
}
