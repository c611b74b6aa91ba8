//! CVSS v3.1 vectors, canonical vector strings, and scoring.
//!
//! Metrics are closed enums, so an invalid value is unrepresentable once a
//! vector exists; all validation happens at the parse boundary and fails
//! loudly with the offending metric key. Scoring itself is pure and total
//! over constructed vectors.

mod score;

pub use score::{score, SeverityBand};

use crate::error::CvssError;
use serde::{Deserialize, Serialize};

macro_rules! metric {
    ($(#[$meta:meta])* $name:ident, { $($variant:ident => $letter:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn letter(self) -> &'static str {
                match self {
                    $(Self::$variant => $letter),+
                }
            }

            pub fn from_letter(letter: &str) -> Option<Self> {
                match letter {
                    $($letter => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

metric!(AttackVector, {
    Network => "N",
    Adjacent => "A",
    Local => "L",
    Physical => "P",
});

metric!(AttackComplexity, {
    Low => "L",
    High => "H",
});

metric!(PrivilegesRequired, {
    None => "N",
    Low => "L",
    High => "H",
});

metric!(UserInteraction, {
    None => "N",
    Required => "R",
});

metric!(Scope, {
    Unchanged => "U",
    Changed => "C",
});

metric!(
    /// Shared by the Confidentiality, Integrity, and Availability metrics.
    Impact, {
    None => "N",
    Low => "L",
    High => "H",
});

metric!(ExploitCodeMaturity, {
    NotDefined => "X",
    High => "H",
    Functional => "F",
    ProofOfConcept => "P",
    Unproven => "U",
});

metric!(RemediationLevel, {
    NotDefined => "X",
    Unavailable => "U",
    Workaround => "W",
    TemporaryFix => "T",
    OfficialFix => "O",
});

metric!(ReportConfidence, {
    NotDefined => "X",
    Confirmed => "C",
    Reasonable => "R",
    Unknown => "U",
});

metric!(
    /// Security requirement weight for one of C/I/A.
    Requirement, {
    NotDefined => "X",
    High => "H",
    Medium => "M",
    Low => "L",
});

/// Temporal metric group. Present only when a vector supplies all three
/// metrics (NotDefined is a valid supplied value); a partial group scores
/// as base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Temporal {
    pub exploit_code_maturity: ExploitCodeMaturity,
    pub remediation_level: RemediationLevel,
    pub report_confidence: ReportConfidence,
}

/// Environmental metric group. `None` in a modified metric means NotDefined:
/// the corresponding base metric is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Environmental {
    pub confidentiality_requirement: Option<Requirement>,
    pub integrity_requirement: Option<Requirement>,
    pub availability_requirement: Option<Requirement>,
    pub modified_attack_vector: Option<AttackVector>,
    pub modified_attack_complexity: Option<AttackComplexity>,
    pub modified_privileges_required: Option<PrivilegesRequired>,
    pub modified_user_interaction: Option<UserInteraction>,
    pub modified_scope: Option<Scope>,
    pub modified_confidentiality: Option<Impact>,
    pub modified_integrity: Option<Impact>,
    pub modified_availability: Option<Impact>,
}

impl Environmental {
    /// A group where every metric is NotDefined contributes nothing and is
    /// treated as absent for both scoring and the vector string.
    pub fn is_defined(&self) -> bool {
        fn req(r: Option<Requirement>) -> bool {
            r.is_some_and(|r| r != Requirement::NotDefined)
        }
        req(self.confidentiality_requirement)
            || req(self.integrity_requirement)
            || req(self.availability_requirement)
            || self.modified_attack_vector.is_some()
            || self.modified_attack_complexity.is_some()
            || self.modified_privileges_required.is_some()
            || self.modified_user_interaction.is_some()
            || self.modified_scope.is_some()
            || self.modified_confidentiality.is_some()
            || self.modified_integrity.is_some()
            || self.modified_availability.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CvssVector {
    pub attack_vector: AttackVector,
    pub attack_complexity: AttackComplexity,
    pub privileges_required: PrivilegesRequired,
    pub user_interaction: UserInteraction,
    pub scope: Scope,
    pub confidentiality: Impact,
    pub integrity: Impact,
    pub availability: Impact,
    pub temporal: Option<Temporal>,
    pub environmental: Option<Environmental>,
}

/// Derived, immutable scoring result. Recomputed from the vector, never
/// edited in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CvssScore {
    pub base_score: f64,
    pub temporal_score: Option<f64>,
    pub environmental_score: Option<f64>,
    pub overall_score: f64,
    pub severity: SeverityBand,
    pub vector_string: String,
}

const PREFIX: &str = "CVSS:3.1";

impl CvssVector {
    /// Canonical vector string: base metrics in specification order, then the
    /// temporal group if present, then every defined environmental metric.
    pub fn vector_string(&self) -> String {
        let mut s = format!(
            "{PREFIX}/AV:{}/AC:{}/PR:{}/UI:{}/S:{}/C:{}/I:{}/A:{}",
            self.attack_vector.letter(),
            self.attack_complexity.letter(),
            self.privileges_required.letter(),
            self.user_interaction.letter(),
            self.scope.letter(),
            self.confidentiality.letter(),
            self.integrity.letter(),
            self.availability.letter(),
        );
        if let Some(t) = &self.temporal {
            s.push_str(&format!(
                "/E:{}/RL:{}/RC:{}",
                t.exploit_code_maturity.letter(),
                t.remediation_level.letter(),
                t.report_confidence.letter(),
            ));
        }
        if let Some(e) = self.environmental.filter(Environmental::is_defined) {
            let mut push = |key: &str, letter: Option<&str>| {
                if let Some(letter) = letter {
                    s.push_str(&format!("/{key}:{letter}"));
                }
            };
            let req = |r: Option<Requirement>| {
                r.filter(|r| *r != Requirement::NotDefined).map(|r| r.letter())
            };
            push("CR", req(e.confidentiality_requirement));
            push("IR", req(e.integrity_requirement));
            push("AR", req(e.availability_requirement));
            push("MAV", e.modified_attack_vector.map(|m| m.letter()));
            push("MAC", e.modified_attack_complexity.map(|m| m.letter()));
            push("MPR", e.modified_privileges_required.map(|m| m.letter()));
            push("MUI", e.modified_user_interaction.map(|m| m.letter()));
            push("MS", e.modified_scope.map(|m| m.letter()));
            push("MC", e.modified_confidentiality.map(|m| m.letter()));
            push("MI", e.modified_integrity.map(|m| m.letter()));
            push("MA", e.modified_availability.map(|m| m.letter()));
        }
        s
    }

    /// Parses a CVSS:3.1 vector string, rejecting unknown keys, repeated
    /// keys, out-of-enumeration values, and missing base metrics.
    pub fn parse(input: &str) -> Result<Self, CvssError> {
        let input = input.trim();
        let rest = input
            .strip_prefix(PREFIX)
            .and_then(|r| r.strip_prefix('/'))
            .ok_or_else(|| {
                let got = input.split('/').next().unwrap_or(input);
                CvssError::UnsupportedVersion(got.to_string())
            })?;

        let mut seen: Vec<String> = Vec::new();
        let mut av = None;
        let mut ac = None;
        let mut pr = None;
        let mut ui = None;
        let mut s = None;
        let mut c = None;
        let mut i = None;
        let mut a = None;
        let mut e = None;
        let mut rl = None;
        let mut rc = None;
        let mut env = Environmental::default();
        let mut env_seen = false;

        for component in rest.split('/') {
            let (key, value) = component
                .split_once(':')
                .ok_or_else(|| CvssError::MalformedComponent(component.to_string()))?;
            if seen.iter().any(|k| k == key) {
                return Err(CvssError::DuplicateMetric {
                    metric: key.to_string(),
                });
            }
            seen.push(key.to_string());

            let invalid = || CvssError::InvalidValue {
                metric: key.to_string(),
                value: value.to_string(),
            };
            match key {
                "AV" => av = Some(AttackVector::from_letter(value).ok_or_else(invalid)?),
                "AC" => ac = Some(AttackComplexity::from_letter(value).ok_or_else(invalid)?),
                "PR" => pr = Some(PrivilegesRequired::from_letter(value).ok_or_else(invalid)?),
                "UI" => ui = Some(UserInteraction::from_letter(value).ok_or_else(invalid)?),
                "S" => s = Some(Scope::from_letter(value).ok_or_else(invalid)?),
                "C" => c = Some(Impact::from_letter(value).ok_or_else(invalid)?),
                "I" => i = Some(Impact::from_letter(value).ok_or_else(invalid)?),
                "A" => a = Some(Impact::from_letter(value).ok_or_else(invalid)?),
                "E" => e = Some(ExploitCodeMaturity::from_letter(value).ok_or_else(invalid)?),
                "RL" => rl = Some(RemediationLevel::from_letter(value).ok_or_else(invalid)?),
                "RC" => rc = Some(ReportConfidence::from_letter(value).ok_or_else(invalid)?),
                "CR" => {
                    env.confidentiality_requirement =
                        Some(Requirement::from_letter(value).ok_or_else(invalid)?);
                    env_seen = true;
                }
                "IR" => {
                    env.integrity_requirement =
                        Some(Requirement::from_letter(value).ok_or_else(invalid)?);
                    env_seen = true;
                }
                "AR" => {
                    env.availability_requirement =
                        Some(Requirement::from_letter(value).ok_or_else(invalid)?);
                    env_seen = true;
                }
                "MAV" => {
                    env.modified_attack_vector =
                        parse_modified(value, AttackVector::from_letter).map_err(|_| invalid())?;
                    env_seen = true;
                }
                "MAC" => {
                    env.modified_attack_complexity =
                        parse_modified(value, AttackComplexity::from_letter)
                            .map_err(|_| invalid())?;
                    env_seen = true;
                }
                "MPR" => {
                    env.modified_privileges_required =
                        parse_modified(value, PrivilegesRequired::from_letter)
                            .map_err(|_| invalid())?;
                    env_seen = true;
                }
                "MUI" => {
                    env.modified_user_interaction =
                        parse_modified(value, UserInteraction::from_letter)
                            .map_err(|_| invalid())?;
                    env_seen = true;
                }
                "MS" => {
                    env.modified_scope =
                        parse_modified(value, Scope::from_letter).map_err(|_| invalid())?;
                    env_seen = true;
                }
                "MC" => {
                    env.modified_confidentiality =
                        parse_modified(value, Impact::from_letter).map_err(|_| invalid())?;
                    env_seen = true;
                }
                "MI" => {
                    env.modified_integrity =
                        parse_modified(value, Impact::from_letter).map_err(|_| invalid())?;
                    env_seen = true;
                }
                "MA" => {
                    env.modified_availability =
                        parse_modified(value, Impact::from_letter).map_err(|_| invalid())?;
                    env_seen = true;
                }
                _ => return Err(CvssError::UnknownMetric(key.to_string())),
            }
        }

        // A temporal group needs all three metrics; a partial one is dropped
        // and the vector scores as base.
        let temporal = match (e, rl, rc) {
            (Some(e), Some(rl), Some(rc)) => Some(Temporal {
                exploit_code_maturity: e,
                remediation_level: rl,
                report_confidence: rc,
            }),
            _ => None,
        };

        Ok(CvssVector {
            attack_vector: av.ok_or(CvssError::MissingMetric("AV"))?,
            attack_complexity: ac.ok_or(CvssError::MissingMetric("AC"))?,
            privileges_required: pr.ok_or(CvssError::MissingMetric("PR"))?,
            user_interaction: ui.ok_or(CvssError::MissingMetric("UI"))?,
            scope: s.ok_or(CvssError::MissingMetric("S"))?,
            confidentiality: c.ok_or(CvssError::MissingMetric("C"))?,
            integrity: i.ok_or(CvssError::MissingMetric("I"))?,
            availability: a.ok_or(CvssError::MissingMetric("A"))?,
            temporal,
            environmental: (env_seen && env.is_defined()).then_some(env),
        })
    }

    pub fn score(&self) -> CvssScore {
        score::score(self)
    }
}

/// "X" in a modified metric means fall back to base, modeled as `None`.
fn parse_modified<T>(value: &str, from: impl Fn(&str) -> Option<T>) -> Result<Option<T>, ()> {
    if value == "X" {
        return Ok(None);
    }
    from(value).map(Some).ok_or(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rejects_unknown_metric() {
        let err = CvssVector::parse("CVSS:3.1/AV:N/AC:L/PR:N/UI:N/S:U/C:H/I:H/A:H/ZZ:Q");
        assert_eq!(err, Err(CvssError::UnknownMetric("ZZ".to_string())));
    }

    #[test]
    fn parse_rejects_invalid_value_naming_the_metric() {
        let err = CvssVector::parse("CVSS:3.1/AV:Q/AC:L/PR:N/UI:N/S:U/C:H/I:H/A:H");
        assert_eq!(
            err,
            Err(CvssError::InvalidValue {
                metric: "AV".to_string(),
                value: "Q".to_string()
            })
        );
    }

    #[test]
    fn parse_rejects_missing_base_metric() {
        let err = CvssVector::parse("CVSS:3.1/AV:N/AC:L/PR:N/UI:N/S:U/C:H/I:H");
        assert_eq!(err, Err(CvssError::MissingMetric("A")));
    }

    #[test]
    fn parse_rejects_wrong_version() {
        let err = CvssVector::parse("CVSS:3.0/AV:N/AC:L/PR:N/UI:N/S:U/C:H/I:H/A:H");
        assert_eq!(err, Err(CvssError::UnsupportedVersion("CVSS:3.0".into())));
    }

    #[test]
    fn parse_rejects_duplicate_metric() {
        let err = CvssVector::parse("CVSS:3.1/AV:N/AV:L/AC:L/PR:N/UI:N/S:U/C:H/I:H/A:H");
        assert_eq!(
            err,
            Err(CvssError::DuplicateMetric {
                metric: "AV".to_string()
            })
        );
    }

    #[test]
    fn partial_temporal_group_is_dropped() {
        let vector = CvssVector::parse("CVSS:3.1/AV:N/AC:L/PR:N/UI:N/S:U/C:H/I:H/A:H/E:F")
            .expect("parse");
        assert_eq!(vector.temporal, None);
        assert_eq!(
            vector.vector_string(),
            "CVSS:3.1/AV:N/AC:L/PR:N/UI:N/S:U/C:H/I:H/A:H"
        );
    }

    #[test]
    fn base_vector_round_trips() {
        let text = "CVSS:3.1/AV:N/AC:L/PR:N/UI:N/S:U/C:H/I:H/A:H";
        let vector = CvssVector::parse(text).expect("parse");
        assert_eq!(vector.vector_string(), text);
        assert_eq!(CvssVector::parse(&vector.vector_string()), Ok(vector));
    }

    #[test]
    fn temporal_and_environmental_round_trip() {
        let text = "CVSS:3.1/AV:A/AC:H/PR:L/UI:R/S:C/C:L/I:L/A:N/E:F/RL:W/RC:R/CR:H/IR:M/MAV:L/MS:U/MC:N";
        let vector = CvssVector::parse(text).expect("parse");
        assert_eq!(vector.vector_string(), text);
        assert_eq!(CvssVector::parse(&vector.vector_string()), Ok(vector));
    }

    #[test]
    fn all_not_defined_environmental_is_absent() {
        let text = "CVSS:3.1/AV:N/AC:L/PR:N/UI:N/S:U/C:H/I:H/A:H/MAV:X/CR:X";
        let vector = CvssVector::parse(text).expect("parse");
        assert_eq!(vector.environmental, None);
        assert_eq!(
            vector.vector_string(),
            "CVSS:3.1/AV:N/AC:L/PR:N/UI:N/S:U/C:H/I:H/A:H"
        );
    }
}
