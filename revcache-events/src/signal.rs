//! Lifecycle signals and their parameter maps.
//!
//! The host delivers each notification as an (emitter, hook name) pair plus a
//! free-form JSON parameter map. Only the documented keys are read.

use revcache_core::{OwnerId, SignalError, VersionId};
use serde_json::Value;

/// Free-form notification parameters.
pub type HookParams = serde_json::Map<String, Value>;

/// Separator between a file path and its version id in a version path.
pub const VERSION_PATH_MARKER: &str = ".v";

/// The four host notifications that invalidate cached artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleSignal {
    UserRemoved,
    FileRemoved,
    VersionRemoved,
    VersionRolledBack,
}

impl LifecycleSignal {
    pub const ALL: [LifecycleSignal; 4] = [
        LifecycleSignal::UserRemoved,
        LifecycleSignal::FileRemoved,
        LifecycleSignal::VersionRemoved,
        LifecycleSignal::VersionRolledBack,
    ];

    /// Host component that emits this signal.
    pub fn emitter(&self) -> &'static str {
        match self {
            Self::UserRemoved => "OC_User",
            Self::FileRemoved => "OC_Filesystem",
            Self::VersionRemoved | Self::VersionRolledBack => "\\OCP\\Versions",
        }
    }

    /// Host hook name for this signal.
    pub fn hook_name(&self) -> &'static str {
        match self {
            Self::UserRemoved => "pre_deleteUser",
            Self::FileRemoved => "delete",
            Self::VersionRemoved => "preDelete",
            Self::VersionRolledBack => "rollback",
        }
    }

    /// (emitter, hook name) pairs the host must route to the adapter.
    pub fn subscriptions() -> Vec<(&'static str, &'static str)> {
        Self::ALL
            .iter()
            .map(|signal| (signal.emitter(), signal.hook_name()))
            .collect()
    }

    /// Map a host hook back to a signal.
    pub fn from_hook(emitter: &str, hook_name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|signal| signal.emitter() == emitter && signal.hook_name() == hook_name)
    }
}

impl std::fmt::Display for LifecycleSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.emitter(), self.hook_name())
    }
}

/// A signal with its parameters decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    UserRemoved { owner: OwnerId },
    FileRemoved { path: String },
    VersionRemoved { path: String, version_id: VersionId },
    VersionRolledBack { path: String, version_id: VersionId },
}

impl LifecycleEvent {
    /// Decode `params` for `signal`.
    ///
    /// Returns `Ok(None)` for an empty `path`, which the host emits for
    /// virtual roots and which never maps to a cached file.
    pub fn parse(
        signal: LifecycleSignal,
        params: &HookParams,
    ) -> Result<Option<Self>, SignalError> {
        let event = match signal {
            LifecycleSignal::UserRemoved => {
                let uid = param(params, "uid")?;
                let owner = OwnerId::new(uid).map_err(|_| invalid("uid"))?;
                Self::UserRemoved { owner }
            }
            LifecycleSignal::FileRemoved => {
                let path = param(params, "path")?;
                if path.is_empty() {
                    return Ok(None);
                }
                Self::FileRemoved { path }
            }
            LifecycleSignal::VersionRemoved => {
                let token = param(params, "path")?;
                if token.is_empty() {
                    return Ok(None);
                }
                let (path, version_id) = split_path_version(&token)?;
                Self::VersionRemoved {
                    path: path.to_string(),
                    version_id,
                }
            }
            LifecycleSignal::VersionRolledBack => {
                let path = param(params, "path")?;
                if path.is_empty() {
                    return Ok(None);
                }
                let revision = param(params, "revision")?;
                let version_id = VersionId::new(revision).map_err(|_| invalid("revision"))?;
                Self::VersionRolledBack { path, version_id }
            }
        };
        Ok(Some(event))
    }

    pub fn signal(&self) -> LifecycleSignal {
        match self {
            Self::UserRemoved { .. } => LifecycleSignal::UserRemoved,
            Self::FileRemoved { .. } => LifecycleSignal::FileRemoved,
            Self::VersionRemoved { .. } => LifecycleSignal::VersionRemoved,
            Self::VersionRolledBack { .. } => LifecycleSignal::VersionRolledBack,
        }
    }
}

/// Read `key` as a string. Numbers are accepted and rendered in decimal.
fn param(params: &HookParams, key: &str) -> Result<String, SignalError> {
    match params.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(_) => Err(invalid(key)),
        None => Err(SignalError::MissingParam {
            key: key.to_string(),
        }),
    }
}

fn invalid(key: &str) -> SignalError {
    SignalError::InvalidParam {
        key: key.to_string(),
    }
}

/// Split `/docs/report.docx.v1700000000` into the file path and version id.
///
/// The split happens at the last `.v`, so `.v` inside the file name is kept.
pub fn split_path_version(token: &str) -> Result<(&str, VersionId), SignalError> {
    let malformed = || SignalError::MalformedVersionPath {
        path: token.to_string(),
    };

    let at = token.rfind(VERSION_PATH_MARKER).ok_or_else(malformed)?;
    let path = &token[..at];
    let version = &token[at + VERSION_PATH_MARKER.len()..];
    if path.is_empty() {
        return Err(malformed());
    }
    let version_id = VersionId::new(version).map_err(|_| malformed())?;
    Ok((path, version_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> HookParams {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_subscriptions_round_trip() {
        let subs = LifecycleSignal::subscriptions();
        assert_eq!(
            subs,
            vec![
                ("OC_User", "pre_deleteUser"),
                ("OC_Filesystem", "delete"),
                ("\\OCP\\Versions", "preDelete"),
                ("\\OCP\\Versions", "rollback"),
            ]
        );
        for (emitter, name) in subs {
            let signal = LifecycleSignal::from_hook(emitter, name).expect("known hook");
            assert_eq!(signal.emitter(), emitter);
            assert_eq!(signal.hook_name(), name);
        }
        assert_eq!(LifecycleSignal::from_hook("OC_Filesystem", "rename"), None);
    }

    #[test]
    fn test_split_path_version_uses_last_marker() {
        let (path, version) =
            split_path_version("/docs/a.very.vivid.docx.v1700000000").expect("valid token");
        assert_eq!(path, "/docs/a.very.vivid.docx");
        assert_eq!(version.as_str(), "1700000000");
    }

    #[test]
    fn test_split_path_version_rejects_malformed() {
        for token in ["/docs/report.docx", "/docs/report.docx.v", ".v123"] {
            assert!(
                matches!(
                    split_path_version(token),
                    Err(SignalError::MalformedVersionPath { .. })
                ),
                "{token} should be malformed"
            );
        }
    }

    #[test]
    fn test_parse_user_removed() {
        let alice = params(json!({"uid": "alice"}));
        let event = LifecycleEvent::parse(LifecycleSignal::UserRemoved, &alice)
            .expect("parse")
            .expect("event");
        assert_eq!(
            event,
            LifecycleEvent::UserRemoved {
                owner: OwnerId::new("alice").expect("valid owner")
            }
        );
        assert_eq!(event.signal(), LifecycleSignal::UserRemoved);

        assert_eq!(
            LifecycleEvent::parse(LifecycleSignal::UserRemoved, &params(json!({"uid": ""}))),
            Err(invalid("uid"))
        );
    }

    #[test]
    fn test_parse_empty_path_is_none() {
        for signal in [
            LifecycleSignal::FileRemoved,
            LifecycleSignal::VersionRemoved,
            LifecycleSignal::VersionRolledBack,
        ] {
            assert_eq!(
                LifecycleEvent::parse(signal, &params(json!({"path": "", "revision": 5}))),
                Ok(None)
            );
        }
    }

    #[test]
    fn test_parse_missing_and_invalid_params() {
        assert_eq!(
            LifecycleEvent::parse(LifecycleSignal::FileRemoved, &HookParams::new()),
            Err(SignalError::MissingParam {
                key: "path".to_string()
            })
        );
        let listed = params(json!({"path": ["x"]}));
        assert_eq!(
            LifecycleEvent::parse(LifecycleSignal::FileRemoved, &listed),
            Err(invalid("path"))
        );
        assert_eq!(
            LifecycleEvent::parse(
                LifecycleSignal::VersionRolledBack,
                &params(json!({"path": "/a.docx"}))
            ),
            Err(SignalError::MissingParam {
                key: "revision".to_string()
            })
        );
    }

    #[test]
    fn test_parse_revision_number_or_string() {
        let expected = LifecycleEvent::VersionRolledBack {
            path: "/a.docx".to_string(),
            version_id: VersionId::from(1_700_000_000u64),
        };
        for revision in [json!(1_700_000_000u64), json!("1700000000")] {
            let event = LifecycleEvent::parse(
                LifecycleSignal::VersionRolledBack,
                &params(json!({"path": "/a.docx", "revision": revision})),
            )
            .expect("parse");
            assert_eq!(event, Some(expected.clone()));
        }
    }

    mod prop_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(200))]

            #[test]
            fn prop_split_recovers_path_and_version(
                path in "/[a-z.]{1,20}",
                version in "[0-9]{1,12}",
            ) {
                let token = format!("{path}.v{version}");
                let (split_path, split_version) =
                    split_path_version(&token).expect("valid token");
                prop_assert_eq!(split_path, path.as_str());
                prop_assert_eq!(split_version.as_str(), version.as_str());
            }
        }
    }
}
