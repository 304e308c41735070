pub mod health;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::models::AppStartTime;
use crate::storage::Storage;

pub struct SystemService;

impl SystemService {
    pub fn new_lazy() -> Self {
        Self
    }

    pub(crate) fn get_config(&self) -> &AppConfig {
        AppConfig::get()
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Option<Arc<dyn Storage>> {
        request
            .app_data::<web::Data<Arc<dyn Storage>>>()
            .map(|storage| storage.get_ref().clone())
    }

    pub(crate) fn get_start_time(&self, request: &HttpRequest) -> Option<AppStartTime> {
        request
            .app_data::<web::Data<AppStartTime>>()
            .map(|start| *start.get_ref())
    }

    // 健康检查
    pub async fn health(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        health::health(self, request).await
    }
}
