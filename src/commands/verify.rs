use tracing::warn;

use crate::models::Check;
use crate::sysctl::profile::VERIFIED;
use crate::sysctl::SysctlRunner;

// `sysctl -n` prints vector values tab-separated; the file uses spaces.
fn normalize(v: &str) -> String {
    v.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Compare the runtime value of `key` with `expected`.
pub fn check_one(runner: &dyn SysctlRunner, key: &str, expected: &str) -> Check {
    match runner.read(key) {
        Ok(actual) if normalize(&actual) == normalize(expected) => {
            Check::Match { key: key.to_string(), value: actual }
        }
        Ok(actual) => {
            warn!(key, expected, %actual, "runtime value differs");
            Check::Mismatch { key: key.to_string(), expected: expected.to_string(), actual }
        }
        Err(e) => {
            warn!(key, error = %e, "runtime value unreadable");
            Check::Unreadable { key: key.to_string(), reason: e.to_string() }
        }
    }
}

/// Read back the headline values of the profile. Advisory only.
pub fn verify_profile(runner: &dyn SysctlRunner) -> Vec<Check> {
    VERIFIED.iter().map(|(key, expected)| check_one(runner, key, expected)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sysctl::mock::MockSysctl;
    use crate::sysctl::profile::CONGESTION_CONTROL_KEY;

    #[test]
    fn whitespace_differences_are_not_mismatches() {
        let runner = MockSysctl::new().pin("net.ipv4.tcp_rmem", "4096\t87380\t67108864");
        let c = check_one(&runner, "net.ipv4.tcp_rmem", "4096 87380 67108864");
        assert!(c.is_match());
    }

    #[test]
    fn pinned_kernel_value_is_a_mismatch() {
        let runner = MockSysctl::new()
            .pin(CONGESTION_CONTROL_KEY, "cubic")
            .pin("net.core.default_qdisc", "fq")
            .pin("net.ipv4.tcp_ecn", "1");
        let checks = verify_profile(&runner);
        assert_eq!(checks.len(), 3);
        assert_eq!(
            checks[0],
            Check::Mismatch {
                key: CONGESTION_CONTROL_KEY.to_string(),
                expected: "bbr".to_string(),
                actual: "cubic".to_string(),
            }
        );
        assert!(checks[1].is_match() && checks[2].is_match());
    }

    #[test]
    fn unknown_key_is_unreadable_not_fatal() {
        let runner = MockSysctl::new();
        let c = check_one(&runner, "net.ipv4.does_not_exist", "1");
        assert!(matches!(c, Check::Unreadable { .. }));
    }
}
