#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use serde_json::Value;
use tutum_deploy::{DeployError, DeployResult, Platform};

pub type CallLog = Rc<RefCell<Vec<String>>>;

/// In-memory platform that records every call.
#[derive(Default)]
pub struct FakePlatform {
    stacks: String,
    images: HashMap<String, Value>,
    services: HashMap<String, Value>,
    fail_on: Option<String>,
    calls: CallLog,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stacks(mut self, listing: &str) -> Self {
        self.stacks = listing.to_string();
        self
    }

    pub fn image(mut self, name: &str, details: Value) -> Self {
        self.images.insert(name.to_string(), details);
        self
    }

    pub fn service(mut self, id: &str, details: Value) -> Self {
        self.services.insert(id.to_string(), details);
        self
    }

    /// Fail every call whose log entry starts with `prefix`.
    pub fn fail_on(mut self, prefix: &str) -> Self {
        self.fail_on = Some(prefix.to_string());
        self
    }

    pub fn calls(&self) -> CallLog {
        Rc::clone(&self.calls)
    }

    fn record(&self, call: String) -> DeployResult<()> {
        let fails = self
            .fail_on
            .as_ref()
            .is_some_and(|prefix| call.starts_with(prefix.as_str()));
        self.calls.borrow_mut().push(call.clone());
        if fails {
            Err(DeployError::Other(format!("fake failure: {call}")))
        } else {
            Ok(())
        }
    }
}

impl Platform for FakePlatform {
    fn list_stacks(&self) -> DeployResult<String> {
        self.record("stack list".to_string())?;
        Ok(self.stacks.clone())
    }

    fn create_stack(&self, name: &str, stackfile: &Path) -> DeployResult<()> {
        self.record(format!("stack up {name} {}", stackfile.display()))
    }

    fn update_stack(&self, id: &str, stackfile: &Path) -> DeployResult<()> {
        self.record(format!("stack update {id} {}", stackfile.display()))
    }

    fn inspect_image(&self, image: &str) -> DeployResult<Value> {
        self.record(format!("image inspect {image}"))?;
        self.images
            .get(image)
            .cloned()
            .ok_or_else(|| DeployError::Other(format!("no such image: {image}")))
    }

    fn inspect_service(&self, id: &str) -> DeployResult<Value> {
        self.record(format!("service inspect {id}"))?;
        self.services
            .get(id)
            .cloned()
            .ok_or_else(|| DeployError::Other(format!("no such service: {id}")))
    }

    fn redeploy_service(&self, id: &str) -> DeployResult<()> {
        self.record(format!("service redeploy {id}"))
    }
}
