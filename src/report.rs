use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::oracle::Sample;
use crate::resolver::ResolutionResult;

const RULE: &str = "-------------------------------------";

fn utc_string(date: Option<DateTime<Utc>>) -> String {
    match date {
        Some(d) => d.format("%a, %d %b %Y %H:%M:%S GMT").to_string(),
        None => "<out of range>".to_string(),
    }
}

fn target_date(target: u64) -> Option<DateTime<Utc>> {
    Sample::new(0, target).date()
}

pub fn render_text(target: u64, result: &ResolutionResult) -> String {
    format!(
        "{RULE}\n\
         Date to Block Result:\n\
         {RULE}\n\
         Target Date (UTC): {}\n\
         Block Number:      {}\n\
         Block Timestamp:   {}\n\
         Block Date (UTC):  {}\n\
         Seconds from Target: {}\n\
         Retries:           {}\n\
         {RULE}\n",
        utc_string(target_date(target)),
        result.sample.index,
        result.sample.timestamp,
        utc_string(result.sample.date()),
        result.seconds_from_target,
        result.attempts,
    )
}

#[derive(Serialize)]
struct JsonBlock {
    number: u64,
    timestamp: u64,
    date: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport {
    target: u64,
    target_date: String,
    block: JsonBlock,
    seconds_from_target: u64,
    retries: u32,
}

pub fn render_json(target: u64, result: &ResolutionResult) -> Value {
    let report = JsonReport {
        target,
        target_date: utc_string(target_date(target)),
        block: JsonBlock {
            number: result.sample.index,
            timestamp: result.sample.timestamp,
            date: utc_string(result.sample.date()),
        },
        seconds_from_target: result.seconds_from_target,
        retries: result.attempts,
    };
    serde_json::to_value(report).unwrap_or(Value::Null)
}
