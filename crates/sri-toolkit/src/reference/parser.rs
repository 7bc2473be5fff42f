use std::io::Read;

use serde::Deserialize;

use super::catalog::ReferenceLoadError;
use super::{DomainWeightRow, LevelRow, ServiceRow};
use crate::scoring::{CriterionScores, ValidationError};

pub(crate) const LEVELS_FILE: &str = "levels.csv";
pub(crate) const DOMAIN_WEIGHTS_FILE: &str = "domain_weights.csv";
pub(crate) const SERVICES_FILE: &str = "services.csv";

#[derive(Debug, Deserialize)]
struct LevelCsvRow {
    code: String,
    domain: String,
    level: String,
    score_cr1: String,
    score_cr2: String,
    score_cr3: String,
    score_cr4: String,
    score_cr5: String,
    score_cr6: String,
    score_cr7: String,
    #[serde(default)]
    mandatory: String,
}

#[derive(Debug, Deserialize)]
struct DomainWeightCsvRow {
    building_type: String,
    zone: String,
    domain: String,
    dw_cr1: String,
    dw_cr2: String,
    dw_cr3: String,
    dw_cr4: String,
    dw_cr5: String,
    dw_cr6: String,
    dw_cr7: String,
}

#[derive(Debug, Deserialize)]
struct ServiceCsvRow {
    code: String,
    domain: String,
    #[serde(default)]
    group: String,
    #[serde(default)]
    service: String,
}

pub(crate) fn parse_levels<R: Read>(reader: R) -> Result<Vec<LevelRow>, ReferenceLoadError> {
    read_rows(reader, LEVELS_FILE, |row: LevelCsvRow| {
        let level = row
            .level
            .trim()
            .parse::<u32>()
            .map_err(|_| ValidationError::NonNumeric {
                field: "level".to_string(),
                value: row.level.clone(),
            })?;
        let scores = parse_columns(
            "score_cr",
            [
                &row.score_cr1,
                &row.score_cr2,
                &row.score_cr3,
                &row.score_cr4,
                &row.score_cr5,
                &row.score_cr6,
                &row.score_cr7,
            ],
        )?;
        let mandatory = parse_flag(&row.mandatory)?;

        Ok(LevelRow {
            code: row.code,
            domain: row.domain,
            level,
            scores,
            mandatory,
        })
    })
}

pub(crate) fn parse_domain_weights<R: Read>(
    reader: R,
) -> Result<Vec<DomainWeightRow>, ReferenceLoadError> {
    read_rows(reader, DOMAIN_WEIGHTS_FILE, |row: DomainWeightCsvRow| {
        let weights = parse_columns(
            "dw_cr",
            [
                &row.dw_cr1,
                &row.dw_cr2,
                &row.dw_cr3,
                &row.dw_cr4,
                &row.dw_cr5,
                &row.dw_cr6,
                &row.dw_cr7,
            ],
        )?;

        Ok(DomainWeightRow {
            building_type: row.building_type,
            zone: row.zone,
            domain: row.domain,
            weights,
        })
    })
}

pub(crate) fn parse_services<R: Read>(reader: R) -> Result<Vec<ServiceRow>, ReferenceLoadError> {
    read_rows(reader, SERVICES_FILE, |row: ServiceCsvRow| {
        Ok(ServiceRow {
            code: row.code,
            domain: row.domain,
            group: row.group,
            description: row.service,
        })
    })
}

fn read_rows<R, Row, T, F>(
    reader: R,
    file: &'static str,
    mut convert: F,
) -> Result<Vec<T>, ReferenceLoadError>
where
    R: Read,
    Row: for<'de> Deserialize<'de>,
    F: FnMut(Row) -> Result<T, ValidationError>,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader
        .headers()
        .map_err(|source| ReferenceLoadError::Csv { file, source })?
        .clone();

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record.map_err(|source| ReferenceLoadError::Csv { file, source })?;
        let line = record.position().map(|pos| pos.line()).unwrap_or_default();
        let row: Row = record
            .deserialize(Some(&headers))
            .map_err(|source| ReferenceLoadError::Csv { file, source })?;
        let converted =
            convert(row).map_err(|source| ReferenceLoadError::Validation { file, line, source })?;
        rows.push(converted);
    }

    Ok(rows)
}

fn parse_columns(prefix: &str, raw: [&String; 7]) -> Result<CriterionScores, ValidationError> {
    let mut values = [0.0; 7];
    for (index, value) in raw.iter().enumerate() {
        values[index] = parse_number(&format!("{prefix}{}", index + 1), value)?;
    }
    Ok(CriterionScores::new(values))
}

fn parse_number(field: &str, raw: &str) -> Result<f64, ValidationError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| ValidationError::NonNumeric {
            field: field.to_string(),
            value: raw.to_string(),
        })
}

fn parse_flag(raw: &str) -> Result<bool, ValidationError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "false" | "no" | "0" => Ok(false),
        "true" | "yes" | "1" => Ok(true),
        _ => Err(ValidationError::NonNumeric {
            field: "mandatory".to_string(),
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::ImpactCriterion;
    use std::io::Cursor;

    const LEVEL_HEADER: &str =
        "code,domain,level,score_cr1,score_cr2,score_cr3,score_cr4,score_cr5,score_cr6,score_cr7,mandatory\n";

    #[test]
    fn levels_parse_scores_in_column_order() {
        let csv = format!("{LEVEL_HEADER} H-1a , Heating ,2,1,2,3,4,5,6,7.5,Yes\n");
        let rows = parse_levels(Cursor::new(csv)).expect("parses");

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.code, "H-1a");
        assert_eq!(row.domain, "Heating");
        assert_eq!(row.level, 2);
        assert!(row.mandatory);
        assert_eq!(row.scores.get(ImpactCriterion::EnergyEfficiency), 1.0);
        assert_eq!(
            row.scores.get(ImpactCriterion::MaintenanceAndFaultPrediction),
            2.0
        );
        assert_eq!(
            row.scores.get(ImpactCriterion::EnergyFlexibilityAndStorage),
            7.5
        );
    }

    #[test]
    fn non_numeric_score_names_field_and_line() {
        let csv = format!("{LEVEL_HEADER}H-1a,Heating,0,0,0,0,0,0,0,0,\nH-1a,Heating,1,1,x,0,0,0,0,0,\n");
        let error = parse_levels(Cursor::new(csv)).expect_err("score must be numeric");

        match error {
            ReferenceLoadError::Validation { file, line, source } => {
                assert_eq!(file, LEVELS_FILE);
                assert_eq!(line, 3);
                assert_eq!(
                    source,
                    ValidationError::NonNumeric {
                        field: "score_cr2".to_string(),
                        value: "x".to_string(),
                    }
                );
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn unknown_mandatory_flag_is_rejected() {
        let csv = format!("{LEVEL_HEADER}H-1a,Heating,0,0,0,0,0,0,0,0,maybe\n");
        assert!(matches!(
            parse_levels(Cursor::new(csv)),
            Err(ReferenceLoadError::Validation { .. })
        ));
    }

    #[test]
    fn domain_weights_reject_non_finite_values() {
        let csv = "building_type,zone,domain,dw_cr1,dw_cr2,dw_cr3,dw_cr4,dw_cr5,dw_cr6,dw_cr7\n\
Residential,West Europe,Heating,0.2,0.2,NaN,0.2,0.2,0.2,0.2\n";
        let error = parse_domain_weights(Cursor::new(csv)).expect_err("NaN rejected");
        assert!(error.to_string().contains("dw_cr3"));
    }

    #[test]
    fn services_keep_group_and_description() {
        let csv = "code,domain,group,service\nL-2,Lighting,Daylight control,\"Control artificial lighting, daylight based\"\n";
        let rows = parse_services(Cursor::new(csv)).expect("parses");
        assert_eq!(rows[0].group, "Daylight control");
        assert_eq!(
            rows[0].description,
            "Control artificial lighting, daylight based"
        );
    }
}
