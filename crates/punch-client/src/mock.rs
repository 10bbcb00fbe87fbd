//! Mock clients for testing

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate};
use std::sync::{Arc, Mutex};

use crate::{
    AttendanceProvider, BusinessCalendar, ClientError, ClientResult, HrEndpoint, Notifier,
};

/// Attendance provider returning a canned result
pub struct MockAttendance {
    /// Outcome of the next fetch
    pub result: Arc<Mutex<ClientResult<Option<DateTime<Local>>>>>,
    /// Dates fetched so far
    pub requested: Arc<Mutex<Vec<NaiveDate>>>,
}

impl MockAttendance {
    pub fn new(result: ClientResult<Option<DateTime<Local>>>) -> Self {
        Self {
            result: Arc::new(Mutex::new(result)),
            requested: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Provider that always reports "no data yet"
    pub fn empty() -> Self {
        Self::new(Ok(None))
    }

    pub fn set_result(&self, result: ClientResult<Option<DateTime<Local>>>) {
        *self.result.lock().unwrap() = result;
    }

    pub fn request_count(&self) -> usize {
        self.requested.lock().unwrap().len()
    }
}

#[async_trait]
impl AttendanceProvider for MockAttendance {
    async fn fetch_check_in(
        &self,
        _endpoint: &HrEndpoint,
        date: NaiveDate,
    ) -> ClientResult<Option<DateTime<Local>>> {
        self.requested.lock().unwrap().push(date);
        self.result.lock().unwrap().clone()
    }
}

/// Notifier recording deliveries
#[derive(Default)]
pub struct MockNotifier {
    /// Deliveries seen so far, as (url, message)
    pub sent: Arc<Mutex<Vec<(String, String)>>>,
    /// Configure delivery to fail
    pub fail: Arc<Mutex<bool>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn deliveries(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn notify(&self, url: &str, message: &str) -> ClientResult<()> {
        if *self.fail.lock().unwrap() {
            return Err(ClientError::Status(500));
        }
        self.sent
            .lock()
            .unwrap()
            .push((url.to_string(), message.to_string()));
        Ok(())
    }
}

/// Calendar answering from a fixed value
pub struct FixedCalendar {
    business: bool,
}

impl FixedCalendar {
    pub fn new(business: bool) -> Self {
        Self { business }
    }
}

#[async_trait]
impl BusinessCalendar for FixedCalendar {
    async fn is_business_day(&self, _date: NaiveDate) -> bool {
        self.business
    }
}
