use super::*;

/// Contract named by the `contract_id` path segment, resolved for the requesting owner
impl FromRequest for contract::Model {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let owner = Owner::from_request(&req, &mut dev::Payload::None).await?;

            let contract_id = req.match_info().get("contract_id").expect("This extractor must be used under `contract_id` path");
            let Ok(contract_id) = Uuid::from_str(contract_id) else {
                return Err(ApiError::validation("contract_id", "invalid `contract_id`").into())
            };

            let db = req.app_data::<web::Data<DatabaseConnection>>().expect("DatabaseConnection must be attached");

            Ok(contracts::find_owned(db.get_ref(), &owner, contract_id).await?)
        })
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, App};
    use sea_orm::{DatabaseBackend, MockDatabase};

    use crate::{auth::{tests::owner, Authority}, ledger::contracts::tests::contract};

    use super::*;

    #[actix_web::test]
    async fn test_contract_extractor() {
        #[get("/{contract_id}")]
        async fn test_handler(contract: contract::Model) -> impl Responder {
            web::Json(contract)
        }

        let secret = b"secret";

        let owner = owner();
        let contract = contract(&owner);

        let token = Authority::new(secret).issue_for(&owner).unwrap();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![ contract.clone() ],
                vec![ ],
            ]);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(secret)))
                .app_data(web::Data::new(db.into_connection()))
                .service(test_handler)
        ).await;

        let req = test::TestRequest::default()
            .uri(&format!("/{}", contract.id))
            .insert_header(("Authorization", format!("JWT {token}")))
            .to_request();

        let returned_contract: contract::Model = test::call_and_read_body_json(&app, req).await;
        assert_eq!(returned_contract, contract);

        // Someone else's contract looks exactly like a missing one
        let req = test::TestRequest::default()
            .uri(&format!("/{}", Uuid::new_v4()))
            .insert_header(("Authorization", format!("JWT {token}")))
            .to_request();

        let response = test::call_service(&app, req).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::default()
            .uri("/not-a-uuid")
            .insert_header(("Authorization", format!("JWT {token}")))
            .to_request();

        let response = test::call_service(&app, req).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::default()
            .uri(&format!("/{}", contract.id))
            .to_request();

        let response = test::call_service(&app, req).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
