use serde::{Deserialize, Serialize};

/// Which side of an order a user is acting as.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Party {
    Passenger,
    Driver,
}

impl Party {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Passenger => "passenger",
            Self::Driver => "driver",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "passenger" => Some(Self::Passenger),
            "driver" => Some(Self::Driver),
            _ => None,
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            Self::Passenger => Self::Driver,
            Self::Driver => Self::Passenger,
        }
    }
}
