use chrono::Local;

use crate::models::Ipv6Policy;
use crate::sysctl::profile;

/// Print the file a run with `policy` would write. Touches nothing.
pub fn show(policy: Ipv6Policy) {
    print!("{}", profile::build(Local::now(), policy));
}
