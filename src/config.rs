use crate::error::{BadEnvVarSnafu, ParseBodyLimitSnafu, StudentsResult};
use dotenvy::var;
use snafu::ResultExt;
use std::env::VarError;

const DEFAULT_SERVER_IP: &str = "127.0.0.1:8080";
const DEFAULT_BODY_LIMIT: usize = 64 * 1024;

#[derive(Clone, Debug)]
pub struct RuntimeConfiguration {
    server_ip: String,
    body_limit: usize,
}

impl RuntimeConfiguration {
    pub fn new() -> StudentsResult<Self> {
        let server_ip =
            optional_env_var("STUDENTS_SERVER_IP")?.unwrap_or_else(|| DEFAULT_SERVER_IP.to_string());
        let body_limit = match optional_env_var("STUDENTS_BODY_LIMIT")? {
            Some(limit) => limit.trim().parse().context(ParseBodyLimitSnafu)?,
            None => DEFAULT_BODY_LIMIT,
        };

        Ok(Self {
            server_ip,
            body_limit,
        })
    }

    pub fn server_ip(&self) -> &str {
        &self.server_ip
    }

    ///max request body size, in bytes
    pub const fn body_limit(&self) -> usize {
        self.body_limit
    }
}

fn optional_env_var(name: &'static str) -> StudentsResult<Option<String>> {
    match var(name) {
        Ok(value) => Ok(Some(value)),
        Err(dotenvy::Error::EnvVar(VarError::NotPresent)) => Ok(None),
        Err(source) => Err(source).context(BadEnvVarSnafu { name }),
    }
}
