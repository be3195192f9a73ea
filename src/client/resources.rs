//! [`Resource`] bindings for the four farm collections.

use super::slice::Resource;
use crate::models::{
    CreateFieldRequest, CreateHarvestRecordRequest, CreateTaskRequest,
    CreateWeatherObservationRequest, Field, FieldSearchParams, HarvestRecord,
    HarvestRecordSearchParams, Task, TaskSearchParams, UpdateFieldRequest,
    UpdateHarvestRecordRequest, UpdateTaskRequest, UpdateWeatherObservationRequest,
    WeatherObservation, WeatherObservationSearchParams,
};

impl Resource for Field {
    type Draft = CreateFieldRequest;
    type Patch = UpdateFieldRequest;
    type Filter = FieldSearchParams;

    const PATH: &'static str = "/fields";
    const NOUN: &'static str = "field";
    const PLURAL: &'static str = "fields";

    fn id(&self) -> i64 {
        self.id
    }
}

impl Resource for Task {
    type Draft = CreateTaskRequest;
    type Patch = UpdateTaskRequest;
    type Filter = TaskSearchParams;

    const PATH: &'static str = "/tasks";
    const NOUN: &'static str = "task";
    const PLURAL: &'static str = "tasks";

    fn id(&self) -> i64 {
        self.id
    }
}

impl Resource for HarvestRecord {
    type Draft = CreateHarvestRecordRequest;
    type Patch = UpdateHarvestRecordRequest;
    type Filter = HarvestRecordSearchParams;

    const PATH: &'static str = "/harvest-records";
    const NOUN: &'static str = "harvest record";
    const PLURAL: &'static str = "harvest records";

    fn id(&self) -> i64 {
        self.id
    }
}

impl Resource for WeatherObservation {
    type Draft = CreateWeatherObservationRequest;
    type Patch = UpdateWeatherObservationRequest;
    type Filter = WeatherObservationSearchParams;

    const PATH: &'static str = "/weather-observations";
    const NOUN: &'static str = "weather observation";
    const PLURAL: &'static str = "weather observations";

    fn id(&self) -> i64 {
        self.id
    }
}
