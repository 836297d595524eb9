//! The fixed tuning profile: base block plus the IPv6 policy blocks.

use chrono::{DateTime, Local};

use super::document::SysctlDocument;
use crate::models::Ipv6Policy;

pub const CONGESTION_CONTROL_KEY: &str = "net.ipv4.tcp_congestion_control";
pub const QDISC_KEY: &str = "net.core.default_qdisc";
pub const ECN_KEY: &str = "net.ipv4.tcp_ecn";

/// Runtime values read back after a reload, with the value each must hold.
pub const VERIFIED: [(&str, &str); 3] = [
    (CONGESTION_CONTROL_KEY, "bbr"),
    (QDISC_KEY, "fq"),
    (ECN_KEY, "1"),
];

type Group = (&'static str, &'static [(&'static str, &'static str)]);

const BASE: &[Group] = &[
    (
        "Congestion control and queueing",
        &[(QDISC_KEY, "fq"), (CONGESTION_CONTROL_KEY, "bbr"), (ECN_KEY, "1")],
    ),
    (
        "Socket buffers",
        &[
            ("net.core.rmem_max", "67108864"),
            ("net.core.wmem_max", "67108864"),
            ("net.core.rmem_default", "262144"),
            ("net.core.wmem_default", "262144"),
            ("net.ipv4.tcp_rmem", "4096 87380 67108864"),
            ("net.ipv4.tcp_wmem", "4096 65536 67108864"),
            ("net.ipv4.udp_rmem_min", "16384"),
            ("net.ipv4.udp_wmem_min", "16384"),
        ],
    ),
    (
        "Backlogs",
        &[
            ("net.core.netdev_max_backlog", "250000"),
            ("net.core.somaxconn", "4096"),
            ("net.ipv4.tcp_max_syn_backlog", "8192"),
        ],
    ),
    (
        "TCP behaviour",
        &[
            ("net.ipv4.tcp_mtu_probing", "1"),
            ("net.ipv4.tcp_fastopen", "3"),
            ("net.ipv4.tcp_slow_start_after_idle", "0"),
            ("net.ipv4.tcp_notsent_lowat", "16384"),
        ],
    ),
    (
        "Timeouts and keepalive",
        &[
            ("net.ipv4.tcp_fin_timeout", "15"),
            ("net.ipv4.tcp_keepalive_time", "600"),
            ("net.ipv4.tcp_keepalive_intvl", "30"),
            ("net.ipv4.tcp_keepalive_probes", "5"),
            ("net.ipv4.tcp_tw_reuse", "1"),
        ],
    ),
    ("Ports", &[("net.ipv4.ip_local_port_range", "1024 65535")]),
];

const IPV6_DISABLE: &[Group] = &[(
    "IPv6 disabled",
    &[
        ("net.ipv6.conf.all.disable_ipv6", "1"),
        ("net.ipv6.conf.default.disable_ipv6", "1"),
        ("net.ipv6.conf.lo.disable_ipv6", "1"),
    ],
)];

const IPV6_ENABLE: &[Group] = &[(
    "IPv6 enabled",
    &[
        ("net.ipv6.conf.all.disable_ipv6", "0"),
        ("net.ipv6.conf.default.disable_ipv6", "0"),
        ("net.ipv6.conf.lo.disable_ipv6", "0"),
        ("net.ipv6.conf.all.forwarding", "1"),
        ("net.ipv6.conf.default.forwarding", "1"),
        ("net.ipv6.conf.all.accept_ra", "2"),
        ("net.ipv6.conf.default.accept_ra", "2"),
    ],
)];

fn push_groups(doc: &mut SysctlDocument, groups: &[Group]) {
    for (title, entries) in groups {
        doc.comment(*title);
        for (k, v) in entries.iter() {
            doc.set(*k, *v);
        }
        doc.blank();
    }
}

/// Base block, headed by a generation timestamp.
pub fn base(generated_at: DateTime<Local>) -> SysctlDocument {
    let mut doc = SysctlDocument::new();
    doc.comment(format!(
        "Generated by nettune on {}",
        generated_at.format("%Y-%m-%d %H:%M:%S %z")
    ))
    .comment("Manual edits are overwritten on the next run.")
    .blank();
    push_groups(&mut doc, BASE);
    doc
}

/// Block appended for the chosen IPv6 policy. Empty for [`Ipv6Policy::Skip`].
pub fn ipv6_block(policy: Ipv6Policy) -> SysctlDocument {
    let mut doc = SysctlDocument::new();
    match policy {
        Ipv6Policy::Disable => push_groups(&mut doc, IPV6_DISABLE),
        Ipv6Policy::Enable => push_groups(&mut doc, IPV6_ENABLE),
        Ipv6Policy::Skip => {}
    }
    doc
}

/// Full document for a policy.
pub fn build(generated_at: DateTime<Local>, policy: Ipv6Policy) -> SysctlDocument {
    let mut doc = base(generated_at);
    doc.extend(&ipv6_block(policy));
    doc
}
