use super::{SwitchProfile, SwitchProfilePortProfile};

/// Checks the cross references inside a profile and returns every problem found.
pub fn validate(profile: &SwitchProfile) -> Vec<String> {
    let mut problems = Vec::new();
    let spec = &profile.spec;

    if profile.name.is_empty() {
        problems.push("profile name is empty".to_string());
    }

    for (name, port) in &spec.ports {
        if port.management {
            if !port.group.is_empty() || !port.profile.is_empty() {
                problems.push(format!(
                    "port {}: management port cannot have a group or profile",
                    name
                ));
            }
            continue;
        }

        match (port.group.is_empty(), port.profile.is_empty()) {
            (true, true) => problems.push(format!("port {}: needs either a group or a profile", name)),
            (false, false) => problems.push(format!(
                "port {}: cannot have both group {} and profile {}",
                name, port.group, port.profile
            )),
            (false, true) if !spec.port_groups.contains_key(&port.group) => {
                problems.push(format!("port {}: unknown group {}", name, port.group))
            }
            (true, false) if !spec.port_profiles.contains_key(&port.profile) => {
                problems.push(format!("port {}: unknown profile {}", name, port.profile))
            }
            _ => {}
        }
    }

    for (name, group) in &spec.port_groups {
        if group.profile.is_empty() {
            problems.push(format!("group {}: needs a profile", name));
        } else if !spec.port_profiles.contains_key(&group.profile) {
            problems.push(format!("group {}: unknown profile {}", name, group.profile));
        }
    }

    for (name, port_profile) in &spec.port_profiles {
        check_port_profile(name, port_profile, &mut problems);
    }

    problems
}

fn check_port_profile(name: &str, port_profile: &SwitchProfilePortProfile, problems: &mut Vec<String>) {
    match (&port_profile.speed, &port_profile.breakout) {
        (None, None) => problems.push(format!(
            "port profile {}: needs either speed or breakout",
            name
        )),
        (Some(_), Some(_)) => problems.push(format!(
            "port profile {}: cannot have both speed and breakout",
            name
        )),
        (Some(speed), None) => {
            if !speed.supported.contains(&speed.default) {
                problems.push(format!(
                    "port profile {}: default speed {} is not supported",
                    name, speed.default
                ));
            }
        }
        (None, Some(breakout)) => {
            if !breakout.supported.contains_key(&breakout.default) {
                problems.push(format!(
                    "port profile {}: default breakout {} is not supported",
                    name, breakout.default
                ));
            }
            for (mode, spec) in &breakout.supported {
                if spec.offsets.is_empty() {
                    problems.push(format!(
                        "port profile {}: breakout {} has no offsets",
                        name, mode
                    ));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{
        SwitchProfilePort, SwitchProfilePortGroup, SwitchProfilePortProfileBreakout,
        SwitchProfilePortProfileBreakoutMode, SwitchProfilePortProfileSpeed, SwitchProfileSpec,
    };
    use std::collections::BTreeMap;

    fn speed(default: &str, supported: &[&str]) -> SwitchProfilePortProfile {
        SwitchProfilePortProfile {
            speed: Some(SwitchProfilePortProfileSpeed {
                default: default.to_string(),
                supported: supported.iter().map(|s| s.to_string()).collect(),
            }),
            ..Default::default()
        }
    }

    fn port(group: &str, profile: &str) -> SwitchProfilePort {
        SwitchProfilePort {
            nos_name: "Ethernet0".to_string(),
            group: group.to_string(),
            profile: profile.to_string(),
            ..Default::default()
        }
    }

    fn profile_with(spec: SwitchProfileSpec) -> SwitchProfile {
        SwitchProfile {
            name: "test".to_string(),
            spec,
        }
    }

    #[test]
    fn test_valid_profile() {
        let mut spec = SwitchProfileSpec::default();
        spec.ports.insert(
            "M1".into(),
            SwitchProfilePort {
                management: true,
                ..Default::default()
            },
        );
        spec.ports.insert("E1/1".into(), port("1", ""));
        spec.ports.insert("E1/2".into(), port("", "SFP28-25G"));
        spec.port_groups.insert(
            "1".into(),
            SwitchProfilePortGroup {
                nos_name: "1".into(),
                profile: "SFP28-25G".into(),
            },
        );
        spec.port_profiles
            .insert("SFP28-25G".into(), speed("25G", &["10G", "25G"]));

        assert!(validate(&profile_with(spec)).is_empty());
    }

    #[test]
    fn test_dangling_references() {
        let mut spec = SwitchProfileSpec::default();
        spec.ports.insert("E1/1".into(), port("9", ""));
        spec.ports.insert("E1/2".into(), port("", "QSFP-missing"));
        spec.port_groups.insert(
            "1".into(),
            SwitchProfilePortGroup {
                nos_name: "1".into(),
                profile: "absent".into(),
            },
        );

        let problems = validate(&profile_with(spec));
        assert_eq!(
            problems,
            vec![
                "port E1/1: unknown group 9".to_string(),
                "port E1/2: unknown profile QSFP-missing".to_string(),
                "group 1: unknown profile absent".to_string(),
            ]
        );
    }

    #[test]
    fn test_port_needs_exactly_one_of_group_or_profile() {
        let mut spec = SwitchProfileSpec::default();
        spec.ports.insert("E1/1".into(), port("", ""));
        spec.ports.insert("E1/2".into(), port("1", "p"));

        let problems = validate(&profile_with(spec));
        assert!(problems[0].contains("needs either a group or a profile"));
        assert!(problems[1].contains("cannot have both"));
    }

    #[test]
    fn test_management_port_with_profile() {
        let mut spec = SwitchProfileSpec::default();
        spec.ports.insert(
            "M1".into(),
            SwitchProfilePort {
                management: true,
                profile: "p".into(),
                ..Default::default()
            },
        );
        let problems = validate(&profile_with(spec));
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("management port"));
    }

    #[test]
    fn test_port_profile_defaults_must_be_supported() {
        let mut spec = SwitchProfileSpec::default();
        spec.port_profiles
            .insert("speed".into(), speed("100G", &["10G", "25G"]));
        let mut supported = BTreeMap::new();
        supported.insert(
            "1x100G".to_string(),
            SwitchProfilePortProfileBreakoutMode {
                offsets: vec!["0".into()],
            },
        );
        supported.insert(
            "4x25G".to_string(),
            SwitchProfilePortProfileBreakoutMode { offsets: vec![] },
        );
        spec.port_profiles.insert(
            "breakout".into(),
            SwitchProfilePortProfile {
                breakout: Some(SwitchProfilePortProfileBreakout {
                    default: "2x50G".into(),
                    supported,
                }),
                ..Default::default()
            },
        );
        spec.port_profiles
            .insert("empty".into(), SwitchProfilePortProfile::default());

        let problems = validate(&profile_with(spec));
        assert_eq!(
            problems,
            vec![
                "port profile breakout: default breakout 2x50G is not supported".to_string(),
                "port profile breakout: breakout 4x25G has no offsets".to_string(),
                "port profile empty: needs either speed or breakout".to_string(),
                "port profile speed: default speed 100G is not supported".to_string(),
            ]
        );
    }

    #[test]
    fn test_empty_name() {
        let profile = SwitchProfile {
            name: String::new(),
            spec: SwitchProfileSpec::default(),
        };
        assert_eq!(validate(&profile), vec!["profile name is empty".to_string()]);
    }
}
