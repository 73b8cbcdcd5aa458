//! Cold-start configuration read from the function's environment.

use lambda_runtime::Error;

const DEFAULT_TABLE_NAME: &str = "all-items";
const DEFAULT_SECURE_ORIGIN: &str = "https://frontend-s-hosting123xxx.s3.us-east-1.amazonaws.com";
const DEFAULT_WEBSITE_ORIGIN: &str =
    "http://frontend-s-hosting123xxx.s3-website-us-east-1.amazonaws.com";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub table_name: String,
    pub secure_origin: String,
    pub website_origin: String,
}

impl Config {
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let var = |key: &str, default: &str| match lookup(key) {
            Some(value) if value.is_empty() => Err(Error::from(format!("{key} is set but empty"))),
            Some(value) => Ok(value),
            None => Ok(default.to_string()),
        };

        Ok(Self {
            table_name: var("TABLE_NAME", DEFAULT_TABLE_NAME)?,
            secure_origin: var("SECURE_ORIGIN", DEFAULT_SECURE_ORIGIN)?,
            website_origin: var("WEBSITE_ORIGIN", DEFAULT_WEBSITE_ORIGIN)?,
        })
    }
}
