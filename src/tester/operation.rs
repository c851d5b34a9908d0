use std::str::FromStr;
use std::time::Duration;

const DEFAULT_SLEEP: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationKind {
    Get,
    Put,
    Delete,
    Changes { channels: Option<String> },
    Purge,
    GetRaw,
    Sleep(Duration),
}

impl OperationKind {
    pub fn label(&self) -> &'static str {
        match self {
            OperationKind::Get => "GET",
            OperationKind::Put => "PUT",
            OperationKind::Delete => "DELETE",
            OperationKind::Changes { .. } => "CHANGES",
            OperationKind::Purge => "PURGE",
            OperationKind::GetRaw => "GET_RAW",
            OperationKind::Sleep(_) => "SLEEP",
        }
    }
}

/// One step of a tester run, e.g. `PUT`, `CHANGES_ADMIN:bob` or `SLEEP:3`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub kind: OperationKind,
    /// Sent to the admin port with admin credentials.
    pub admin: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OperationParseError {
    #[error("unknown operation '{0}'")]
    Unknown(String),
    #[error("operation '{0}' takes no argument")]
    UnexpectedArgument(String),
}

impl FromStr for Operation {
    type Err = OperationParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        let (head, arg) = match raw.split_once(':') {
            Some((head, arg)) => (head, Some(arg)),
            None => (raw, None),
        };
        let (name, admin) = match head.strip_suffix("_ADMIN") {
            Some(name) => (name, true),
            None => (head, false),
        };
        let kind = match (name, arg) {
            ("GET", None) => OperationKind::Get,
            ("PUT", None) => OperationKind::Put,
            ("DELETE", None) => OperationKind::Delete,
            ("PURGE", None) => OperationKind::Purge,
            ("GET_RAW", None) => OperationKind::GetRaw,
            ("CHANGES", arg) => OperationKind::Changes {
                channels: arg
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string),
            },
            ("SLEEP", arg) => OperationKind::Sleep(parse_sleep(raw, arg)),
            ("GET" | "PUT" | "DELETE" | "PURGE" | "GET_RAW", Some(_)) => {
                return Err(OperationParseError::UnexpectedArgument(raw.to_string()));
            }
            _ => return Err(OperationParseError::Unknown(raw.to_string())),
        };
        // Purge and raw reads only exist on the admin interface
        let admin = admin || matches!(kind, OperationKind::Purge | OperationKind::GetRaw);
        Ok(Operation { kind, admin })
    }
}

fn parse_sleep(raw: &str, arg: Option<&str>) -> Duration {
    let Some(arg) = arg else {
        return DEFAULT_SLEEP;
    };
    match arg.trim().parse::<u64>() {
        Ok(secs) => Duration::from_secs(secs),
        Err(_) => {
            tracing::warn!("Invalid sleep time format: {}. Using default 1 second.", raw);
            DEFAULT_SLEEP
        }
    }
}
