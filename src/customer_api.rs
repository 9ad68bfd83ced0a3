use serde::{Deserialize, Serialize, de::DeserializeOwned};
use snafu::{ResultExt, Snafu};
use url::Url;

/// Version segment of the customer API endpoint path.
pub(crate) const API_VERSION: &str = "unstable";

/// Identity fields of the logged-in customer, as served by the customer API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email_address: Option<EmailAddress>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailAddress {
    pub email_address: String,
}

const CUSTOMER_QUERY: &str = "\
query {
  customer {
    id
    firstName
    lastName
    emailAddress {
      emailAddress
    }
  }
}";

#[derive(Debug, Snafu)]
pub enum GraphQlError {
    #[snafu(display("GraphQlError: Could not send request"))]
    Transport { source: reqwest::Error },

    #[snafu(display("GraphQlError: Received unexpected status code {status}"))]
    Status { status: reqwest::StatusCode },

    #[snafu(display("GraphQlError: Could not decode payload"))]
    Decode { source: reqwest::Error },

    #[snafu(display("GraphQlError: Query execution failed: {message}"))]
    Execution { message: String },
}

/// GraphQL client for the Customer Account API.
///
/// Every query is authenticated with the caller's bearer token. There are no
/// retries and no token refreshing here; an expired token surfaces as an
/// error and the caller decides what to do about the session.
#[derive(Debug, Clone)]
pub struct CustomerApiClient {
    client: reqwest::Client,
    endpoint: Url,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQlResponseError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponseError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct CustomerQueryData {
    customer: Customer,
}

impl CustomerApiClient {
    pub fn new(client: reqwest::Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    /// Fetches the customer the access token belongs to.
    pub async fn current_customer(&self, access_token: &str) -> Result<Customer, GraphQlError> {
        let data: CustomerQueryData = self
            .query(access_token, CUSTOMER_QUERY, serde_json::json!({}))
            .await?;
        Ok(data.customer)
    }

    /// Executes a GraphQL query, authenticated as the given customer.
    ///
    /// A non-success HTTP status and a non-empty `errors` list are distinct
    /// failures; for the latter, the first error's message is surfaced.
    pub async fn query<T: DeserializeOwned>(
        &self,
        access_token: &str,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, GraphQlError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(access_token)
            .json(&serde_json::json!({
                "query": query,
                "variables": variables,
            }))
            .send()
            .await
            .context(TransportSnafu {})?;

        let status = response.status();
        if !status.is_success() {
            return Err(StatusSnafu { status }.build());
        }

        let body = response
            .json::<GraphQlResponse<T>>()
            .await
            .context(DecodeSnafu {})?;

        if let Some(errors) = body.errors {
            if let Some(first) = errors.into_iter().next() {
                return Err(ExecutionSnafu {
                    message: first.message,
                }
                .build());
            }
        }

        match body.data {
            Some(data) => Ok(data),
            None => Err(ExecutionSnafu {
                message: "Response contained no data".to_owned(),
            }
            .build()),
        }
    }
}
