//! Typed endpoints of the `/api/v1/` API.
//!
//! Every method goes through `ApiClient::send`, so all of them get bearer
//! authentication and token renewal.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::models::{
    Business, Cashbook, Category, ExportFormat, Member, NewCashbook, NewLookup, NewTransaction,
    Page, Party, PaymentMode, Report, Summary, Transaction, TransactionFilter, UserRole,
};

use super::{ApiClient, ApiError, ApiRequest};

const CASHBOOKS: &str = "/api/v1/cashbooks/";
const TRANSACTIONS: &str = "/api/v1/transactions/";
const SUMMARY: &str = "/api/v1/summary/";
const CATEGORIES: &str = "/api/v1/categories/";
const MEMBERS: &str = "/api/v1/members/";
const PARTIES: &str = "/api/v1/parties/";
const PAYMENT_MODES: &str = "/api/v1/payment-modes/";
const BUSINESSES: &str = "/api/v1/businesses/";
const REPORTS: &str = "/api/v1/reports/";

fn detail_path(collection: &str, id: i64) -> String {
    format!("{}{}/", collection, id)
}

impl ApiClient {
    async fn list<T: DeserializeOwned>(
        &self,
        path: &str,
        cashbook: Option<i64>,
    ) -> Result<Vec<T>, ApiError> {
        let mut request = ApiRequest::get(path);
        if let Some(cashbook) = cashbook {
            request = request.query("cashbook", cashbook.to_string());
        }
        let page: Page<T> = self.fetch(request).await?;
        Ok(page.into_items())
    }

    async fn create<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        self.fetch(ApiRequest::post(path).json(body)?).await
    }

    async fn remove(&self, path: String) -> Result<(), ApiError> {
        self.send(ApiRequest::delete(path)).await?;
        Ok(())
    }

    // ===== Cashbooks =====

    pub async fn list_cashbooks(&self) -> Result<Vec<Cashbook>, ApiError> {
        self.list(CASHBOOKS, None).await
    }

    pub async fn create_cashbook(&self, cashbook: &NewCashbook) -> Result<Cashbook, ApiError> {
        self.create(CASHBOOKS, cashbook).await
    }

    /// The caller's role and permissions on a cashbook.
    pub async fn cashbook_user_role(&self, cashbook_id: i64) -> Result<UserRole, ApiError> {
        let path = format!("{}{}/user-role/", CASHBOOKS, cashbook_id);
        self.fetch(ApiRequest::get(path)).await
    }

    pub async fn delete_cashbook(&self, cashbook_id: i64) -> Result<(), ApiError> {
        self.remove(detail_path(CASHBOOKS, cashbook_id)).await
    }

    // ===== Transactions =====

    pub async fn list_transactions(
        &self,
        filter: &TransactionFilter,
    ) -> Result<Page<Transaction>, ApiError> {
        let request = ApiRequest::get(TRANSACTIONS).query_pairs(filter.to_query());
        self.fetch(request).await
    }

    /// Validate and create a transaction.
    pub async fn create_transaction(&self, transaction: &NewTransaction) -> Result<Transaction, ApiError> {
        transaction.validate().map_err(ApiError::InvalidRequest)?;
        self.create(TRANSACTIONS, transaction).await
    }

    pub async fn update_transaction(
        &self,
        transaction_id: i64,
        transaction: &NewTransaction,
    ) -> Result<Transaction, ApiError> {
        transaction.validate().map_err(ApiError::InvalidRequest)?;
        let request = ApiRequest::put(detail_path(TRANSACTIONS, transaction_id)).json(transaction)?;
        self.fetch(request).await
    }

    pub async fn delete_transaction(&self, transaction_id: i64) -> Result<(), ApiError> {
        self.remove(detail_path(TRANSACTIONS, transaction_id)).await
    }

    /// Totals for a cashbook under the same filters as the transaction list.
    /// Paging is ignored.
    pub async fn summary(&self, cashbook_id: i64, filter: &TransactionFilter) -> Result<Summary, ApiError> {
        let scoped = TransactionFilter {
            cashbook: Some(cashbook_id),
            page: None,
            ..filter.clone()
        };
        let request = ApiRequest::get(SUMMARY).query_pairs(scoped.to_query());
        self.fetch(request).await
    }

    // ===== Lookups =====

    pub async fn list_categories(&self, cashbook: Option<i64>) -> Result<Vec<Category>, ApiError> {
        self.list(CATEGORIES, cashbook).await
    }

    pub async fn create_category(&self, category: &NewLookup) -> Result<Category, ApiError> {
        self.create(CATEGORIES, category).await
    }

    pub async fn list_members(&self, cashbook: Option<i64>) -> Result<Vec<Member>, ApiError> {
        self.list(MEMBERS, cashbook).await
    }

    /// The member body is passed through as-is.
    pub async fn create_member(&self, member: &serde_json::Value) -> Result<Member, ApiError> {
        self.create(MEMBERS, member).await
    }

    pub async fn list_parties(&self, cashbook: Option<i64>) -> Result<Vec<Party>, ApiError> {
        self.list(PARTIES, cashbook).await
    }

    pub async fn create_party(&self, party: &NewLookup) -> Result<Party, ApiError> {
        self.create(PARTIES, party).await
    }

    pub async fn list_payment_modes(&self, cashbook: Option<i64>) -> Result<Vec<PaymentMode>, ApiError> {
        self.list(PAYMENT_MODES, cashbook).await
    }

    pub async fn create_payment_mode(&self, mode: &NewLookup) -> Result<PaymentMode, ApiError> {
        self.create(PAYMENT_MODES, mode).await
    }

    pub async fn list_businesses(&self) -> Result<Vec<Business>, ApiError> {
        self.list(BUSINESSES, None).await
    }

    pub async fn create_business(&self, business: &NewLookup) -> Result<Business, ApiError> {
        self.create(BUSINESSES, business).await
    }

    // ===== Reports =====

    pub async fn list_reports(&self) -> Result<Vec<Report>, ApiError> {
        self.list(REPORTS, None).await
    }

    pub async fn report(&self, report_id: i64) -> Result<Report, ApiError> {
        self.fetch(ApiRequest::get(detail_path(REPORTS, report_id))).await
    }

    /// Download a report as an Excel workbook or PDF.
    pub async fn export_report(&self, report_id: i64, format: ExportFormat) -> Result<Vec<u8>, ApiError> {
        let path = format!("{}{}/{}/", REPORTS, report_id, format.endpoint());
        let response = self.send(ApiRequest::get(path).binary()).await?;
        Ok(response.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use reqwest::{Method, StatusCode};
    use serde_json::json;

    use super::*;
    use crate::api::testing::{json_response, status_response, ScriptedTransport};
    use crate::api::HttpResponse;
    use crate::auth::{MemoryTokenStore, Session};
    use crate::config::ClientConfig;
    use crate::models::{DateRange, TransactionType};

    fn client(transport: &Arc<ScriptedTransport>) -> ApiClient {
        let session = Arc::new(Session::new(Arc::new(MemoryTokenStore::new())));
        ApiClient::with_transport(ClientConfig::new("http://api.test"), session, transport.clone())
    }

    #[tokio::test]
    async fn test_list_accepts_both_shapes() {
        let transport = ScriptedTransport::new(|req| {
            if req.url.ends_with(CASHBOOKS) {
                Ok(json_response(200, json!({"count": 1, "next": null, "previous": null, "results": [{"id": 1, "name": "Shop"}]})))
            } else {
                Ok(json_response(200, json!([{"id": 4, "name": "Rent"}, {"id": 5, "name": "Fuel"}])))
            }
        });
        let client = client(&transport);

        let books = client.list_cashbooks().await.unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].name, "Shop");

        let categories = client.list_categories(Some(1)).await.unwrap();
        assert_eq!(categories.len(), 2);
        let sent = transport.requests();
        assert_eq!(sent[1].query, vec![("cashbook".to_string(), "1".to_string())]);
    }

    #[tokio::test]
    async fn test_list_transactions_query() {
        let transport = ScriptedTransport::new(|_| {
            Ok(json_response(200, json!({"count": 16, "next": "http://api.test/api/v1/transactions/?page=2", "previous": null, "results": [
                {"id": 9, "type": "IN", "amount": "10.00"}
            ]})))
        });
        let client = client(&transport);

        let filter = TransactionFilter {
            kind: Some(TransactionType::CashIn),
            duration: DateRange::Today,
            ..TransactionFilter::for_cashbook(2)
        };
        let page = client.list_transactions(&filter).await.unwrap();
        assert_eq!(page.total_count(), 16);
        assert!(page.has_next());

        let sent = &transport.requests()[0];
        assert_eq!(sent.url, "http://api.test/api/v1/transactions/");
        assert_eq!(sent.query, filter.to_query());
    }

    #[tokio::test]
    async fn test_summary_drops_page() {
        let transport = ScriptedTransport::new(|_| {
            Ok(json_response(200, json!({"total_in": "10", "total_out": "4", "net_balance": "6"})))
        });
        let client = client(&transport);

        let filter = TransactionFilter {
            page: Some(3),
            search: Some("fuel".into()),
            ..Default::default()
        };
        let summary = client.summary(7, &filter).await.unwrap();
        assert_eq!(summary.net_balance, 6.0);

        let query = &transport.requests()[0].query;
        assert!(query.contains(&("cashbook".to_string(), "7".to_string())));
        assert!(query.contains(&("search".to_string(), "fuel".to_string())));
        assert!(!query.iter().any(|(k, _)| k == "page"));
    }

    #[tokio::test]
    async fn test_create_transaction_validates_before_sending() {
        let transport = ScriptedTransport::new(|req| {
            assert_eq!(req.method, Method::POST);
            Ok(json_response(201, json!({"id": 30, "type": "OUT", "amount": 12.5})))
        });
        let client = client(&transport);

        let mut tx = NewTransaction::new(1, TransactionType::CashOut, 12.5);
        let err = client.create_transaction(&tx).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(ref m) if m == "Category is required"));
        assert!(transport.requests().is_empty());

        tx.category = Some(2);
        tx.payment_mode = Some(1);
        let created = client.create_transaction(&tx).await.unwrap();
        assert_eq!(created.id, 30);
        assert_eq!(transport.requests()[0].body.as_ref().unwrap()["type"], "OUT");
    }

    #[tokio::test]
    async fn test_validation_errors_surface() {
        let transport = ScriptedTransport::new(|_| {
            Ok(json_response(400, json!({"name": ["This field may not be blank."]})))
        });
        let client = client(&transport);

        let err = client.create_category(&NewLookup::named("")).await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
        assert_eq!(err.field_errors(), vec!["name: This field may not be blank.".to_string()]);
    }

    #[tokio::test]
    async fn test_delete_and_paths() {
        let transport = ScriptedTransport::new(|req| {
            assert_eq!(req.method, Method::DELETE);
            Ok(status_response(204))
        });
        let client = client(&transport);

        client.delete_transaction(12).await.unwrap();
        client.delete_cashbook(3).await.unwrap();
        let urls: Vec<String> = transport.requests().into_iter().map(|r| r.url).collect();
        assert_eq!(
            urls,
            vec![
                "http://api.test/api/v1/transactions/12/".to_string(),
                "http://api.test/api/v1/cashbooks/3/".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_export_report() {
        let transport = ScriptedTransport::new(|req| {
            let body = if req.url.ends_with("/export_excel/") {
                b"PK\x03\x04".to_vec()
            } else {
                b"%PDF".to_vec()
            };
            Ok(HttpResponse {
                status: StatusCode::OK,
                content_type: Some("application/octet-stream".into()),
                body,
            })
        });
        let client = client(&transport);

        let xlsx = client.export_report(5, ExportFormat::Excel).await.unwrap();
        assert_eq!(xlsx, b"PK\x03\x04".to_vec());
        let pdf = client.export_report(5, ExportFormat::Pdf).await.unwrap();
        assert_eq!(pdf, b"%PDF".to_vec());
        assert_eq!(
            transport.requests()[1].url,
            "http://api.test/api/v1/reports/5/export_pdf/"
        );
    }

    #[tokio::test]
    async fn test_user_role() {
        let transport = ScriptedTransport::new(|_| {
            Ok(json_response(200, json!({"role": "OWNER", "can_create": true})))
        });
        let client = client(&transport);

        let role = client.cashbook_user_role(8).await.unwrap();
        assert!(role.can_create);
        assert!(!role.can_delete);
        assert!(transport.requests()[0].url.ends_with("/api/v1/cashbooks/8/user-role/"));
    }
}
