//! Query strings and small response helpers shared by the resource routes.

use axum::Json;
use chrono::{NaiveDate, NaiveDateTime};
use models::{account_transaction::validate_description, money::validate_money};
use serde::Deserialize;
use service::{domain::TransactionDetails, pagination::LastN};

use crate::errors::JsonApiError;

/// `?start_date=yyyy-MM-dd&end_date=yyyy-MM-dd`
#[derive(Debug, Deserialize)]
pub struct DateRangeQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl DateRangeQuery {
    /// Whole days: start at midnight, end at the last nanosecond.
    pub fn bounds(&self) -> Result<(NaiveDateTime, NaiveDateTime), JsonApiError> {
        if self.start_date > self.end_date {
            return Err(JsonApiError::bad_request("start_date must not be after end_date"));
        }
        let start = self.start_date.and_hms_opt(0, 0, 0);
        let end = self.end_date.and_hms_nano_opt(23, 59, 59, 999_999_999);
        start.zip(end).ok_or_else(|| JsonApiError::bad_request("date out of range"))
    }
}

#[derive(Debug, Deserialize)]
pub struct LastQuery {
    pub count: Option<u32>,
}

impl LastQuery {
    pub fn window(&self) -> Result<LastN, JsonApiError> {
        match self.count {
            Some(0) => Err(JsonApiError::bad_request("count must be at least 1")),
            other => Ok(LastN::from_param(other)),
        }
    }
}

pub fn validate_details(details: &TransactionDetails) -> Result<(), JsonApiError> {
    validate_description(&details.description)?;
    validate_money("amount", details.amount)?;
    Ok(())
}

/// Listing endpoints answer 404 instead of an empty array.
pub fn non_empty<T>(items: Vec<T>, what: &str) -> Result<Json<Vec<T>>, JsonApiError> {
    if items.is_empty() {
        return Err(JsonApiError::not_found(format!("no {what} found")));
    }
    Ok(Json(items))
}

pub fn found<T>(item: Option<T>, what: &str) -> Result<Json<T>, JsonApiError> {
    item.map(Json).ok_or_else(|| JsonApiError::not_found(format!("{what} not found")))
}
