/// Id is the Rust equivalent of the Postgres `bigserial` keys used
/// throughout the schema. It round-trips as a plain JSON number.
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    sqlx::Type,
)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct Id(i64);

impl Id {
    pub fn new(value: i64) -> Self {
        Self(value)
    }
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Id {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>().map(Id)
    }
}

impl From<i64> for Id {
    fn from(value: i64) -> Self {
        Id(value)
    }
}

#[cfg(test)]
mod test {
    use super::Id;

    #[test]
    fn id_round_trips_as_a_json_number() {
        let id: Id = serde_json::from_str("7").unwrap();
        assert_eq!(id, Id::new(7));
        assert_eq!(serde_json::to_string(&id).unwrap(), "7");
    }

    #[test]
    fn id_parses_from_path_segments() {
        let id: Id = "42".parse().unwrap();
        assert_eq!(id.as_i64(), 42);
        assert!("not-an-id".parse::<Id>().is_err());
    }
}
