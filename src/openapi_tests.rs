#[cfg(test)]
mod tests {
    use utoipa::OpenApi;

    use crate::schemas::ApiDoc;

    #[test]
    fn test_openapi_schema_generation() {
        // Test that the OpenAPI schema can be generated without errors
        let openapi = ApiDoc::openapi();

        // Verify that the schema contains the expected components
        assert!(openapi.components.is_some());
        let components = openapi.components.as_ref().unwrap();

        assert!(components.schemas.contains_key("ErrorResponse"));
        assert!(components.schemas.contains_key("ValidationErrorResponse"));
        assert!(components.schemas.contains_key("HealthResponse"));
        assert!(components.schemas.contains_key("AchievementResponse"));

        // Verify that the schema can be serialized to JSON without errors
        let json_result = serde_json::to_string(&openapi);
        assert!(json_result.is_ok());
    }

    #[test]
    fn test_validation_error_response_schema_structure() {
        let openapi = ApiDoc::openapi();
        let components = openapi.components.as_ref().unwrap();
        let schema = components.schemas.get("ValidationErrorResponse").unwrap();

        // Verify ValidationErrorResponse has the expected structure
        if let utoipa::openapi::RefOr::T(utoipa::openapi::schema::Schema::Object(obj)) = schema {
            let properties = &obj.properties;
            assert!(properties.contains_key("errors"));
            assert!(properties.contains_key("code"));
            assert!(properties.contains_key("success"));
        } else {
            panic!("ValidationErrorResponse should be an object schema");
        }
    }

    #[test]
    fn test_achievement_paths_are_documented() {
        let openapi = ApiDoc::openapi();
        let paths = &openapi.paths.paths;

        assert!(paths.contains_key("/api/v1/achievements"));
        assert!(paths.contains_key("/api/v1/achievements/{achievement_id}"));
        assert!(paths.contains_key("/api/v1/users"));
        assert!(paths.contains_key("/health"));
    }
}
