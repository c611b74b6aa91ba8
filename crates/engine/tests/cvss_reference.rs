//! CVSS v3.1 parsing and scoring against published reference values.

use solaudit_engine::cvss::CvssVector;
use solaudit_engine::{CvssError, SeverityBand};

#[test]
fn network_full_impact_scores_nine_eight() {
    let score = CvssVector::parse("CVSS:3.1/AV:N/AC:L/PR:N/UI:N/S:U/C:H/I:H/A:H")
        .expect("parse")
        .score();
    assert_eq!(score.base_score, 9.8);
    assert_eq!(score.overall_score, 9.8);
    assert_eq!(score.severity, SeverityBand::Critical);
    assert_eq!(score.temporal_score, None);
    assert_eq!(score.environmental_score, None);
}

#[test]
fn availability_only_scores_seven_five() {
    let score = CvssVector::parse("CVSS:3.1/AV:N/AC:L/PR:N/UI:N/S:U/C:N/I:N/A:H")
        .expect("parse")
        .score();
    assert_eq!(score.base_score, 7.5);
    assert_eq!(score.severity, SeverityBand::High);
}

#[test]
fn canonical_string_round_trips() {
    for text in [
        "CVSS:3.1/AV:N/AC:L/PR:N/UI:N/S:U/C:H/I:H/A:H",
        "CVSS:3.1/AV:L/AC:H/PR:H/UI:R/S:C/C:L/I:N/A:L",
        "CVSS:3.1/AV:N/AC:L/PR:N/UI:N/S:U/C:H/I:H/A:H/E:F/RL:W/RC:R",
        "CVSS:3.1/AV:N/AC:L/PR:N/UI:N/S:U/C:H/I:H/A:H/CR:H/MAV:A/MC:L",
    ] {
        let vector = CvssVector::parse(text).expect(text);
        assert_eq!(vector.vector_string(), text);
        let reparsed = CvssVector::parse(&vector.vector_string()).expect("reparse");
        assert_eq!(reparsed, vector);
    }
}

#[test]
fn score_is_embedded_in_its_own_vector_string() {
    let score = CvssVector::parse("CVSS:3.1/AV:N/AC:L/PR:N/UI:N/S:U/C:N/I:L/A:N")
        .expect("parse")
        .score();
    assert_eq!(
        score.vector_string,
        "CVSS:3.1/AV:N/AC:L/PR:N/UI:N/S:U/C:N/I:L/A:N"
    );
}

#[test]
fn rejects_wrong_version_prefix() {
    let err = CvssVector::parse("CVSS:3.0/AV:N/AC:L/PR:N/UI:N/S:U/C:H/I:H/A:H").unwrap_err();
    assert!(matches!(err, CvssError::UnsupportedVersion(_)));
}

#[test]
fn rejects_duplicate_metric() {
    let err =
        CvssVector::parse("CVSS:3.1/AV:N/AV:L/AC:L/PR:N/UI:N/S:U/C:H/I:H/A:H").unwrap_err();
    assert!(matches!(err, CvssError::DuplicateMetric { .. }));
}

#[test]
fn rejects_unknown_metric_key() {
    let err =
        CvssVector::parse("CVSS:3.1/AV:N/AC:L/PR:N/UI:N/S:U/C:H/I:H/A:H/ZZ:Q").unwrap_err();
    assert!(matches!(err, CvssError::UnknownMetric { .. }));
}

#[test]
fn rejects_invalid_metric_value() {
    let err = CvssVector::parse("CVSS:3.1/AV:Q/AC:L/PR:N/UI:N/S:U/C:H/I:H/A:H").unwrap_err();
    assert!(matches!(err, CvssError::InvalidValue { .. }));
}

#[test]
fn rejects_missing_base_metric() {
    let err = CvssVector::parse("CVSS:3.1/AV:N/AC:L/PR:N/UI:N/S:U/C:H/I:H").unwrap_err();
    assert!(matches!(err, CvssError::MissingMetric("A")));
}

#[test]
fn partial_temporal_group_falls_back_to_base() {
    let score = CvssVector::parse("CVSS:3.1/AV:N/AC:L/PR:N/UI:N/S:U/C:H/I:H/A:H/E:F")
        .expect("parse")
        .score();
    assert_eq!(score.base_score, 9.8);
    assert_eq!(score.temporal_score, None);
    assert_eq!(score.overall_score, 9.8);
    assert_eq!(score.severity, SeverityBand::Critical);
}

#[test]
fn severity_bands_cover_the_scale() {
    let cases = [
        ("CVSS:3.1/AV:N/AC:L/PR:N/UI:N/S:U/C:N/I:N/A:N", SeverityBand::None),
        ("CVSS:3.1/AV:P/AC:H/PR:H/UI:R/S:U/C:L/I:N/A:N", SeverityBand::Low),
        ("CVSS:3.1/AV:N/AC:L/PR:N/UI:N/S:U/C:L/I:N/A:N", SeverityBand::Medium),
        ("CVSS:3.1/AV:N/AC:L/PR:N/UI:N/S:U/C:N/I:N/A:H", SeverityBand::High),
        ("CVSS:3.1/AV:N/AC:L/PR:N/UI:N/S:U/C:H/I:H/A:H", SeverityBand::Critical),
    ];
    for (text, expected) in cases {
        let score = CvssVector::parse(text).expect(text).score();
        assert_eq!(score.severity, expected, "{text} scored {}", score.overall_score);
    }
}

#[test]
fn temporal_metrics_never_raise_the_base() {
    let base = CvssVector::parse("CVSS:3.1/AV:N/AC:L/PR:N/UI:N/S:U/C:H/I:H/A:H")
        .expect("parse")
        .score()
        .base_score;
    for e in ["X", "H", "F", "P", "U"] {
        let text =
            format!("CVSS:3.1/AV:N/AC:L/PR:N/UI:N/S:U/C:H/I:H/A:H/E:{e}/RL:X/RC:X");
        let score = CvssVector::parse(&text).expect("parse").score();
        let temporal = score.temporal_score.expect("temporal");
        assert!(temporal <= base, "{text}: {temporal} > {base}");
    }
}
