use csd_client::domain::{parse_last_updated, Asset, GenerationByFuel, Interchange, Summary};
use serde::Deserialize;
use serde_json::Value;
use time::PrimitiveDateTime;

use crate::pipeline::PipelineError;

/// Both CSD reports nest their payload under a `return` key.
#[derive(Deserialize)]
struct Wrapped<T> {
    #[serde(rename = "return")]
    body: T,
}

fn unwrap_report<T>(report: &str, value: Value) -> Result<T, PipelineError>
where
    T: for<'de> Deserialize<'de>,
{
    serde_json::from_value::<Wrapped<T>>(value)
        .map(|w| w.body)
        .map_err(|e| PipelineError::Transform(format!("malformed {report} report: {e}")))
}

fn parse_updated(report: &str, raw: &str) -> Result<PrimitiveDateTime, PipelineError> {
    parse_last_updated(raw).map_err(|e| PipelineError::Transform(format!("{report} report: {e}")))
}

pub type Entries<'a> = std::iter::Enumerate<std::slice::Iter<'a, Value>>;

/// A list that is absent (or null) fails only when the run reaches it.
fn entries<'a>(list: &'static str, values: &'a Option<Vec<Value>>) -> Result<Entries<'a>, PipelineError> {
    values
        .as_deref()
        .map(|v| v.iter().enumerate())
        .ok_or_else(|| PipelineError::Transform(format!("report has no {list}")))
}

fn entry_error(list: &'static str, index: usize, e: serde_json::Error) -> PipelineError {
    metrics::counter!("csd_mapping_rejected_total", "list" => list).increment(1);
    PipelineError::Transform(format!("{list}[{index}]: {e}"))
}

/// Body of the current summary report.
///
/// Scalars are decoded eagerly. The lists are checked and their entries mapped
/// one at a time as they are written.
#[derive(Debug, Deserialize)]
pub struct SummaryReport {
    last_updated_datetime_utc: String,
    total_max_generation_capability: i64,
    total_net_generation: i64,
    net_to_grid_generation: i64,
    net_actual_interchange: i64,
    alberta_internal_load: i64,
    contingency_reserve_required: i64,
    dispatched_contigency_reserve_total: i64,
    dispatched_contingency_reserve_gen: i64,
    dispatched_contingency_reserve_other: i64,
    lssi_armed_dispatch: i64,
    lssi_offered_volume: i64,
    generation_data_list: Option<Vec<Value>>,
    interchange_list: Option<Vec<Value>>,
}

impl SummaryReport {
    pub fn from_json(value: Value) -> Result<Self, PipelineError> {
        unwrap_report("summary", value)
    }

    pub fn last_updated(&self) -> Result<PrimitiveDateTime, PipelineError> {
        parse_updated("summary", &self.last_updated_datetime_utc)
    }

    pub fn to_summary(&self, run_time: PrimitiveDateTime, last_updated: PrimitiveDateTime) -> Summary {
        Summary {
            rowtime: run_time,
            last_updated_datetime_utc: last_updated,
            total_max_generation_capability: self.total_max_generation_capability,
            total_net_generation: self.total_net_generation,
            net_to_grid_generation: self.net_to_grid_generation,
            net_actual_interchange: self.net_actual_interchange,
            alberta_internal_load: self.alberta_internal_load,
            contingency_reserve_required: self.contingency_reserve_required,
            dispatched_contigency_reserve_total: self.dispatched_contigency_reserve_total,
            dispatched_contingency_reserve_gen: self.dispatched_contingency_reserve_gen,
            dispatched_contingency_reserve_other: self.dispatched_contingency_reserve_other,
            lssi_armed_dispatch: self.lssi_armed_dispatch,
            lssi_offered_volume: self.lssi_offered_volume,
        }
    }

    pub fn generation_entries(&self) -> Result<Entries<'_>, PipelineError> {
        entries("generation_data_list", &self.generation_data_list)
    }

    pub fn interchange_entries(&self) -> Result<Entries<'_>, PipelineError> {
        entries("interchange_list", &self.interchange_list)
    }
}

/// Body of the current generation assets report.
#[derive(Debug, Deserialize)]
pub struct AssetsReport {
    last_updated_datetime_utc: String,
    asset_list: Option<Vec<Value>>,
}

impl AssetsReport {
    pub fn from_json(value: Value) -> Result<Self, PipelineError> {
        unwrap_report("assets", value)
    }

    pub fn last_updated(&self) -> Result<PrimitiveDateTime, PipelineError> {
        parse_updated("assets", &self.last_updated_datetime_utc)
    }

    pub fn asset_entries(&self) -> Result<Entries<'_>, PipelineError> {
        entries("asset_list", &self.asset_list)
    }
}

#[derive(Deserialize)]
struct FuelEntry {
    fuel_type: String,
    aggregated_maximum_capability: i64,
    aggregated_net_generation: i64,
    aggregated_dispatched_contingency_reserve: i64,
}

#[derive(Deserialize)]
struct InterchangeEntry {
    path: String,
    actual_flow: i64,
}

#[derive(Deserialize)]
struct AssetEntry {
    asset: String,
    fuel_type: String,
    sub_fuel_type: String,
    maximum_capability: i64,
    net_generation: i64,
    dispatched_contingency_reserve: i64,
}

pub fn map_generation_by_fuel(
    (index, entry): (usize, &Value),
    run_time: PrimitiveDateTime,
    last_updated: PrimitiveDateTime,
) -> Result<GenerationByFuel, PipelineError> {
    let e = FuelEntry::deserialize(entry).map_err(|e| entry_error("generation_data_list", index, e))?;

    Ok(GenerationByFuel {
        rowtime: run_time,
        last_updated_datetime_utc: last_updated,
        fuel_type: e.fuel_type,
        aggregated_maximum_capability: e.aggregated_maximum_capability,
        aggregated_net_generation: e.aggregated_net_generation,
        aggregated_dispatched_contingency_reserve: e.aggregated_dispatched_contingency_reserve,
    })
}

/// The report names the interchange path `path`; it is stored as `location`.
pub fn map_interchange(
    (index, entry): (usize, &Value),
    run_time: PrimitiveDateTime,
    last_updated: PrimitiveDateTime,
) -> Result<Interchange, PipelineError> {
    let e = InterchangeEntry::deserialize(entry).map_err(|e| entry_error("interchange_list", index, e))?;

    Ok(Interchange {
        rowtime: run_time,
        last_updated_datetime_utc: last_updated,
        location: e.path,
        actual_flow: e.actual_flow,
    })
}

pub fn map_asset(
    (index, entry): (usize, &Value),
    run_time: PrimitiveDateTime,
    last_updated: PrimitiveDateTime,
) -> Result<Asset, PipelineError> {
    let e = AssetEntry::deserialize(entry).map_err(|e| entry_error("asset_list", index, e))?;

    Ok(Asset {
        rowtime: run_time,
        last_updated_datetime_utc: last_updated,
        asset: e.asset,
        fuel_type: e.fuel_type,
        sub_fuel_type: e.sub_fuel_type,
        maximum_capability: e.maximum_capability,
        net_generation: e.net_generation,
        dispatched_contingency_reserve: e.dispatched_contingency_reserve,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::datetime;

    const RUN: PrimitiveDateTime = datetime!(2024-05-03 17:46:05);
    const UPDATED: PrimitiveDateTime = datetime!(2024-05-03 17:45);

    fn summary_body() -> Value {
        json!({
            "return": {
                "last_updated_datetime_utc": "2024-05-03 17:45",
                "total_max_generation_capability": 19512,
                "total_net_generation": 10257,
                "net_to_grid_generation": 9101,
                "net_actual_interchange": -321,
                "alberta_internal_load": 9936,
                "contingency_reserve_required": 541,
                "dispatched_contigency_reserve_total": 562,
                "dispatched_contingency_reserve_gen": 403,
                "dispatched_contingency_reserve_other": 159,
                "lssi_armed_dispatch": 7,
                "lssi_offered_volume": 121,
                "generation_data_list": [],
                "interchange_list": []
            }
        })
    }

    #[test]
    fn summary_fields_are_copied_verbatim() {
        let report = SummaryReport::from_json(summary_body()).unwrap();
        let updated = report.last_updated().unwrap();
        assert_eq!(updated, UPDATED);

        let s = report.to_summary(RUN, updated);
        assert_eq!(
            s,
            Summary {
                rowtime: RUN,
                last_updated_datetime_utc: UPDATED,
                total_max_generation_capability: 19512,
                total_net_generation: 10257,
                net_to_grid_generation: 9101,
                net_actual_interchange: -321,
                alberta_internal_load: 9936,
                contingency_reserve_required: 541,
                dispatched_contigency_reserve_total: 562,
                dispatched_contingency_reserve_gen: 403,
                dispatched_contingency_reserve_other: 159,
                lssi_armed_dispatch: 7,
                lssi_offered_volume: 121,
            }
        );
    }

    #[test]
    fn report_without_return_wrapper_is_rejected() {
        let res = SummaryReport::from_json(json!({ "message": "Unauthorized" }));
        assert!(matches!(res, Err(PipelineError::Transform(_))));
    }

    #[test]
    fn unparseable_last_updated_is_rejected() {
        let mut body = summary_body();
        body["return"]["last_updated_datetime_utc"] = json!("soon");
        let report = SummaryReport::from_json(body).unwrap();
        assert!(matches!(report.last_updated(), Err(PipelineError::Transform(_))));
    }

    #[test]
    fn fuel_entry_maps_by_key_name() {
        let entry = json!({
            "fuel_type": "GAS",
            "aggregated_net_generation": 100,
            "aggregated_maximum_capability": 200,
            "aggregated_dispatched_contingency_reserve": 0
        });

        let fuel = map_generation_by_fuel((0, &entry), RUN, UPDATED).unwrap();
        assert_eq!(fuel.fuel_type, "GAS");
        assert_eq!(fuel.aggregated_net_generation, 100);
        assert_eq!(fuel.aggregated_maximum_capability, 200);
        assert_eq!(fuel.aggregated_dispatched_contingency_reserve, 0);
        assert_eq!(fuel.rowtime, RUN);
        assert_eq!(fuel.last_updated_datetime_utc, UPDATED);
    }

    #[test]
    fn fuel_entry_missing_key_names_the_entry() {
        let entry = json!({
            "fuel_type": "COAL",
            "aggregated_maximum_capability": 0,
            "aggregated_dispatched_contingency_reserve": 0
        });

        match map_generation_by_fuel((4, &entry), RUN, UPDATED) {
            Err(PipelineError::Transform(msg)) => {
                assert!(msg.contains("generation_data_list[4]"), "{msg}");
                assert!(msg.contains("aggregated_net_generation"), "{msg}");
            }
            other => panic!("expected transform error, got {other:?}"),
        }
    }

    #[test]
    fn interchange_path_becomes_location() {
        let entry = json!({ "path": "Saskatchewan", "actual_flow": -14 });
        let i = map_interchange((0, &entry), RUN, UPDATED).unwrap();
        assert_eq!(i.location, "Saskatchewan");
        assert_eq!(i.actual_flow, -14);
    }

    #[test]
    fn non_integer_flow_is_rejected() {
        let entry = json!({ "path": "Montana", "actual_flow": "80" });
        assert!(map_interchange((1, &entry), RUN, UPDATED).is_err());
    }

    #[test]
    fn asset_entry_ignores_extra_keys() {
        let entry = json!({
            "asset": "SH1",
            "fuel_type": "GAS",
            "sub_fuel_type": "SIMPLE_CYCLE",
            "maximum_capability": 450,
            "net_generation": 0,
            "dispatched_contingency_reserve": 45,
            "asset_name": "Sheerness #1"
        });

        let a = map_asset((0, &entry), RUN, UPDATED).unwrap();
        assert_eq!(a.asset, "SH1");
        assert_eq!(a.sub_fuel_type, "SIMPLE_CYCLE");
        assert_eq!(a.maximum_capability, 450);
        assert_eq!(a.dispatched_contingency_reserve, 45);
    }

    #[test]
    fn assets_report_keeps_entry_order() {
        let report = AssetsReport::from_json(json!({
            "return": {
                "last_updated_datetime_utc": "2024-05-03 17:44",
                "asset_list": [{ "asset": "A" }, { "asset": "B" }, { "asset": "C" }]
            }
        }))
        .unwrap();

        assert_eq!(report.last_updated().unwrap(), datetime!(2024-05-03 17:44));
        let names: Vec<&str> = report
            .asset_entries()
            .unwrap()
            .map(|(_, v)| v["asset"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn missing_list_fails_only_when_read() {
        let mut body = summary_body();
        body["return"].as_object_mut().unwrap().remove("interchange_list");
        let report = SummaryReport::from_json(body).unwrap();

        assert_eq!(report.generation_entries().unwrap().count(), 0);
        match report.interchange_entries() {
            Err(PipelineError::Transform(msg)) => assert!(msg.contains("interchange_list"), "{msg}"),
            Err(e) => panic!("expected transform error, got {e:?}"),
            Ok(_) => panic!("expected missing interchange_list to fail"),
        }
    }

    #[test]
    fn null_asset_list_is_rejected() {
        let report = AssetsReport::from_json(json!({
            "return": { "last_updated_datetime_utc": "2024-05-03 17:44", "asset_list": null }
        }))
        .unwrap();
        assert!(report.asset_entries().is_err());
    }
}
