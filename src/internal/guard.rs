//! Panic containment around transient constructors.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::error::{ConstructError, DiError, DiResult};

/// Runs a constructor, folding both its error and any panic into
/// [`DiError::TransientClassInstantiationFailed`].
pub(crate) fn with_construction_catch<T, F>(concrete: &'static str, f: F) -> DiResult<T>
where
    F: FnOnce() -> Result<T, ConstructError>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(error)) => Err(DiError::TransientClassInstantiationFailed {
            concrete,
            reason: error.to_string(),
        }),
        Err(payload) => Err(DiError::TransientClassInstantiationFailed {
            concrete,
            reason: panic_message(payload.as_ref()),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        format!("constructor panicked: {}", message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("constructor panicked: {}", message)
    } else {
        "constructor panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_is_folded() {
        let result: DiResult<u8> =
            with_construction_catch("Widget", || Err(ConstructError::failed("no power")));
        assert_eq!(
            result.unwrap_err(),
            DiError::TransientClassInstantiationFailed {
                concrete: "Widget",
                reason: "no power".to_string(),
            }
        );
    }

    #[test]
    fn panic_is_folded() {
        let result: DiResult<u8> = with_construction_catch("Widget", || panic!("boom"));
        match result {
            Err(DiError::TransientClassInstantiationFailed { concrete, reason }) => {
                assert_eq!(concrete, "Widget");
                assert!(reason.contains("boom"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn success_passes_through() {
        let result = with_construction_catch("Widget", || Ok::<_, ConstructError>(7u8));
        assert_eq!(result, Ok(7));
    }
}
