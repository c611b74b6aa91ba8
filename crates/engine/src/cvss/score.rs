//! CVSS v3.1 scoring formulas, as published.
//!
//! Rounding is the standard's "round up to one decimal" (Appendix A),
//! not round-to-nearest; the 9.8/7.5 reference vectors only come out right
//! with the published constants and this rounding.

use super::{
    AttackComplexity, AttackVector, CvssScore, CvssVector, Environmental, Impact,
    PrivilegesRequired, Requirement, Scope, Temporal, UserInteraction,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SeverityBand {
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl SeverityBand {
    pub fn from_score(score: f64) -> Self {
        if score <= 0.0 {
            Self::None
        } else if score < 4.0 {
            Self::Low
        } else if score < 7.0 {
            Self::Medium
        } else if score < 9.0 {
            Self::High
        } else {
            Self::Critical
        }
    }
}

impl std::fmt::Display for SeverityBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::None => "None",
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        };
        f.write_str(s)
    }
}

pub fn score(vector: &CvssVector) -> CvssScore {
    let base_score = base(vector);
    let temporal_score = vector
        .temporal
        .map(|t| roundup(base_score * temporal_multiplier(&t)));
    let environmental_score = vector
        .environmental
        .filter(Environmental::is_defined)
        .map(|e| environmental(vector, &e));

    let overall_score = environmental_score
        .or(temporal_score)
        .unwrap_or(base_score);

    CvssScore {
        base_score,
        temporal_score,
        environmental_score,
        overall_score,
        severity: SeverityBand::from_score(overall_score),
        vector_string: vector.vector_string(),
    }
}

fn base(v: &CvssVector) -> f64 {
    let iss = 1.0
        - (1.0 - impact_weight(v.confidentiality))
            * (1.0 - impact_weight(v.integrity))
            * (1.0 - impact_weight(v.availability));
    let impact = match v.scope {
        Scope::Unchanged => 6.42 * iss,
        Scope::Changed => 7.52 * (iss - 0.029) - 3.25 * (iss - 0.02).powi(15),
    };
    let exploitability = 8.22
        * av_weight(v.attack_vector)
        * ac_weight(v.attack_complexity)
        * pr_weight(v.privileges_required, v.scope)
        * ui_weight(v.user_interaction);

    if impact <= 0.0 {
        return 0.0;
    }
    match v.scope {
        Scope::Unchanged => roundup((impact + exploitability).min(10.0)),
        Scope::Changed => roundup((1.08 * (impact + exploitability)).min(10.0)),
    }
}

fn environmental(v: &CvssVector, e: &Environmental) -> f64 {
    let scope = e.modified_scope.unwrap_or(v.scope);
    let mc = impact_weight(e.modified_confidentiality.unwrap_or(v.confidentiality));
    let mi = impact_weight(e.modified_integrity.unwrap_or(v.integrity));
    let ma = impact_weight(e.modified_availability.unwrap_or(v.availability));
    let cr = requirement_weight(e.confidentiality_requirement);
    let ir = requirement_weight(e.integrity_requirement);
    let ar = requirement_weight(e.availability_requirement);

    let miss = (1.0 - (1.0 - cr * mc) * (1.0 - ir * mi) * (1.0 - ar * ma)).min(0.915);
    let modified_impact = match scope {
        Scope::Unchanged => 6.42 * miss,
        Scope::Changed => 7.52 * (miss - 0.029) - 3.25 * (miss * 0.9731 - 0.02).powi(13),
    };
    let modified_exploitability = 8.22
        * av_weight(e.modified_attack_vector.unwrap_or(v.attack_vector))
        * ac_weight(e.modified_attack_complexity.unwrap_or(v.attack_complexity))
        * pr_weight(
            e.modified_privileges_required.unwrap_or(v.privileges_required),
            scope,
        )
        * ui_weight(e.modified_user_interaction.unwrap_or(v.user_interaction));

    if modified_impact <= 0.0 {
        return 0.0;
    }
    let temporal_product = v.temporal.map(|t| temporal_multiplier(&t)).unwrap_or(1.0);
    match scope {
        Scope::Unchanged => roundup(
            roundup((modified_impact + modified_exploitability).min(10.0)) * temporal_product,
        ),
        Scope::Changed => roundup(
            roundup((1.08 * (modified_impact + modified_exploitability)).min(10.0))
                * temporal_product,
        ),
    }
}

fn temporal_multiplier(t: &Temporal) -> f64 {
    use super::{ExploitCodeMaturity as E, RemediationLevel as RL, ReportConfidence as RC};
    let e = match t.exploit_code_maturity {
        E::NotDefined | E::High => 1.0,
        E::Functional => 0.97,
        E::ProofOfConcept => 0.94,
        E::Unproven => 0.91,
    };
    let rl = match t.remediation_level {
        RL::NotDefined | RL::Unavailable => 1.0,
        RL::Workaround => 0.97,
        RL::TemporaryFix => 0.96,
        RL::OfficialFix => 0.95,
    };
    let rc = match t.report_confidence {
        RC::NotDefined | RC::Confirmed => 1.0,
        RC::Reasonable => 0.96,
        RC::Unknown => 0.92,
    };
    e * rl * rc
}

fn av_weight(av: AttackVector) -> f64 {
    match av {
        AttackVector::Network => 0.85,
        AttackVector::Adjacent => 0.62,
        AttackVector::Local => 0.55,
        AttackVector::Physical => 0.2,
    }
}

fn ac_weight(ac: AttackComplexity) -> f64 {
    match ac {
        AttackComplexity::Low => 0.77,
        AttackComplexity::High => 0.44,
    }
}

fn pr_weight(pr: PrivilegesRequired, scope: Scope) -> f64 {
    match (pr, scope) {
        (PrivilegesRequired::None, _) => 0.85,
        (PrivilegesRequired::Low, Scope::Unchanged) => 0.62,
        (PrivilegesRequired::Low, Scope::Changed) => 0.68,
        (PrivilegesRequired::High, Scope::Unchanged) => 0.27,
        (PrivilegesRequired::High, Scope::Changed) => 0.5,
    }
}

fn ui_weight(ui: UserInteraction) -> f64 {
    match ui {
        UserInteraction::None => 0.85,
        UserInteraction::Required => 0.62,
    }
}

fn impact_weight(i: Impact) -> f64 {
    match i {
        Impact::None => 0.0,
        Impact::Low => 0.22,
        Impact::High => 0.56,
    }
}

fn requirement_weight(r: Option<Requirement>) -> f64 {
    match r.unwrap_or(Requirement::NotDefined) {
        Requirement::NotDefined | Requirement::Medium => 1.0,
        Requirement::High => 1.5,
        Requirement::Low => 0.5,
    }
}

/// Round-up-to-one-decimal as defined in CVSS v3.1 Appendix A. The detour
/// through an integer avoids the floating-point artifacts the naive
/// `(x * 10).ceil() / 10` exhibits (e.g. 8.6 * 0.915).
fn roundup(value: f64) -> f64 {
    let scaled = (value * 100_000.0).round() as i64;
    if scaled % 10_000 == 0 {
        scaled as f64 / 100_000.0
    } else {
        ((scaled as f64 / 10_000.0).floor() + 1.0) / 10.0
    }
}
