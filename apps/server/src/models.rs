use serde::Serialize;
use serde_json::Value;
use showroom_core::vehicles::{FilterCounts, QueryResult};
use utoipa::ToSchema;

/// Page of vehicles returned by the listing endpoint.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VehicleListResponse {
    pub success: bool,
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<Value>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
    #[schema(value_type = Object)]
    pub filter_counts: FilterCounts,
}

impl VehicleListResponse {
    /// Records are emitted under their column names, restricted to `fields` when given.
    pub fn from_result(
        result: QueryResult,
        fields: Option<&[String]>,
    ) -> showroom_core::Result<Self> {
        let data = result
            .data
            .iter()
            .map(|record| match fields {
                Some(fields) => record.project(fields).map(Value::Object),
                None => serde_json::to_value(record)
                    .map_err(|e| showroom_core::Error::Unexpected(e.to_string())),
            })
            .collect::<showroom_core::Result<Vec<_>>>()?;
        Ok(Self {
            success: true,
            data,
            total: result.total,
            page: result.page,
            limit: result.limit,
            total_pages: result.total_pages,
            filter_counts: result.filter_counts,
        })
    }
}

#[derive(Serialize, ToSchema)]
pub struct SimilarVehiclesResponse {
    pub vins: Vec<String>,
}
