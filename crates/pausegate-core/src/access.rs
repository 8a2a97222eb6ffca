//! Access evaluation: may this visitor see the site while maintenance is on?

use pausegate_types::identity::RequestIdentity;
use pausegate_types::settings::SettingsRecord;

/// Grant access if either the role bypass or the IP bypass applies
pub fn can_access(identity: &RequestIdentity, settings: &SettingsRecord) -> bool {
	has_bypass_role(identity, settings) || is_whitelisted_ip(identity, settings)
}

/// Only authenticated visitors can bypass by role
pub fn has_bypass_role(identity: &RequestIdentity, settings: &SettingsRecord) -> bool {
	identity.is_authenticated
		&& settings
			.bypass_roles
			.iter()
			.any(|role| identity.roles.iter().any(|r| r.as_ref() == role.as_str()))
}

/// Exact string match, no CIDR ranges
pub fn is_whitelisted_ip(identity: &RequestIdentity, settings: &SettingsRecord) -> bool {
	!settings.whitelisted_ips.is_empty()
		&& !identity.client_ip.is_empty()
		&& settings.whitelisted_ips.iter().any(|ip| ip.as_str() == identity.client_ip.as_ref())
}


// vim: ts=4
