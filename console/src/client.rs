//! HTTP client for the placement API.
//!
//! Every response arrives wrapped (`{success, message, data}`); the shared
//! handlers unwrap the `data` payload, promote `success: false` bodies to
//! errors, and map 401 to the session-expired failure. All requests carry
//! the configured timeout and, once logged in, a bearer token.

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tutorlink_model::{
    Applicant, ApplicationStatus, ParentApplication, StudentApplication, Teacher, TeacherStatus,
    Vacancy, VacancyForm, VacancyStatus,
};

use crate::config::Config;
use crate::error::ConsoleError;

/// API client for communicating with the placement service.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client from config and an optional session token.
    pub fn new(config: &Config, token: Option<&str>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token))
                    .context("Invalid token format")?,
            );
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build a URL for an endpoint.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ---- vacancies ----

    pub async fn list_vacancies(&self) -> Result<Vec<Vacancy>, ConsoleError> {
        self.fetch("/vacancies").await
    }

    pub async fn featured_vacancies(&self) -> Result<Vec<Vacancy>, ConsoleError> {
        self.fetch("/vacancies/featured").await
    }

    /// Create a vacancy. New postings always start open.
    pub async fn create_vacancy(&self, form: &VacancyForm) -> Result<(), ConsoleError> {
        self.post(
            "/vacancies",
            &CreateVacancyBody {
                form,
                status: VacancyStatus::Open,
            },
        )
        .await
    }

    pub async fn update_vacancy(&self, id: &str, form: &VacancyForm) -> Result<(), ConsoleError> {
        self.put(&format!("/vacancies/{}", id), form).await
    }

    /// Partial update that only touches the featured flag.
    pub async fn set_vacancy_featured(
        &self,
        id: &str,
        featured: bool,
    ) -> Result<(), ConsoleError> {
        self.put(&format!("/vacancies/{}", id), &FeaturedBody { featured })
            .await
    }

    pub async fn delete_vacancy(&self, id: &str) -> Result<(), ConsoleError> {
        self.delete(&format!("/vacancies/{}", id)).await
    }

    pub async fn update_vacancy_status(
        &self,
        id: &str,
        status: VacancyStatus,
    ) -> Result<(), ConsoleError> {
        self.patch(&format!("/vacancies/{}/status", id), &StatusBody { status })
            .await
    }

    pub async fn vacancy_applicants(&self, id: &str) -> Result<Vec<Applicant>, ConsoleError> {
        self.fetch(&format!("/vacancies/{}/applicants", id)).await
    }

    pub async fn update_application_status(
        &self,
        vacancy_id: &str,
        application_id: &str,
        status: ApplicationStatus,
    ) -> Result<(), ConsoleError> {
        self.put(
            &format!(
                "/vacancies/{}/applications/{}/status",
                vacancy_id, application_id
            ),
            &StatusBody { status },
        )
        .await
    }

    // ---- teachers ----

    pub async fn list_teacher_signups(&self) -> Result<Vec<Teacher>, ConsoleError> {
        self.fetch("/teacher-apply/all").await
    }

    pub async fn update_teacher_status(
        &self,
        id: &str,
        status: TeacherStatus,
    ) -> Result<(), ConsoleError> {
        self.put(
            &format!("/teacher-apply/{}/status", id),
            &StatusBody { status },
        )
        .await
    }

    pub async fn teachers_by_status(
        &self,
        status: TeacherStatus,
    ) -> Result<Vec<Teacher>, ConsoleError> {
        self.fetch(&format!("/teacher-apply/status/{}", status)).await
    }

    /// The document reference for a teacher's uploaded CV.
    pub async fn teacher_cv(&self, id: &str) -> Result<String, ConsoleError> {
        self.fetch(&format!("/teacher-apply/{}/cv", id)).await
    }

    // ---- students and parents ----

    pub async fn list_student_requests(&self) -> Result<Vec<StudentApplication>, ConsoleError> {
        self.fetch("/student-apply/all").await
    }

    pub async fn delete_student_request(&self, id: &str) -> Result<(), ConsoleError> {
        self.delete(&format!("/student-apply/delete/{}", id)).await
    }

    pub async fn list_parent_requests(&self) -> Result<Vec<ParentApplication>, ConsoleError> {
        self.fetch("/parent-apply/all").await
    }

    pub async fn delete_parent_request(&self, id: &str) -> Result<(), ConsoleError> {
        self.delete(&format!("/parent-apply/delete/{}", id)).await
    }

    // ---- auth ----

    /// Authenticate and obtain a session token.
    ///
    /// The login body is not enveloped: `success`/`token` sit at the top
    /// level. A 401 here means bad credentials, not an expired session.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<LoginSession, ConsoleError> {
        let response = self
            .client
            .post(self.url("/admin/login"))
            .json(&LoginRequest { username, password })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return match self.handle_error::<LoginSession>(response).await {
                Err(ConsoleError::SessionExpired) => {
                    Err(ConsoleError::api(401, "Invalid username or password"))
                }
                other => other,
            };
        }

        let body = response.text().await?;
        let login: LoginResponse = serde_json::from_str(&body)?;
        match login.token {
            Some(token) if login.success => Ok(LoginSession {
                token,
                admin: login.admin,
            }),
            _ => Err(ConsoleError::api(
                status.as_u16(),
                login
                    .message
                    .unwrap_or_else(|| "Login failed".to_string()),
            )),
        }
    }

    // ---- statistics ----

    /// Aggregate signup counts for the dashboard cards.
    pub async fn dashboard_stats(&self) -> Result<DashboardStats, ConsoleError> {
        let (students, parents, teachers) = tokio::try_join!(
            self.list_student_requests(),
            self.list_parent_requests(),
            self.list_teacher_signups(),
        )?;
        Ok(DashboardStats::tally(&students, &parents, &teachers))
    }

    // ---- request plumbing ----

    async fn fetch<T: DeserializeOwned + Default>(&self, path: &str) -> Result<T, ConsoleError> {
        let response = self.client.get(self.url(path)).send().await?;
        self.handle_response(response).await
    }

    async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<(), ConsoleError> {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        self.handle_ack(response).await
    }

    async fn put<B: Serialize>(&self, path: &str, body: &B) -> Result<(), ConsoleError> {
        let response = self.client.put(self.url(path)).json(body).send().await?;
        self.handle_ack(response).await
    }

    async fn patch<B: Serialize>(&self, path: &str, body: &B) -> Result<(), ConsoleError> {
        let response = self.client.patch(self.url(path)).json(body).send().await?;
        self.handle_ack(response).await
    }

    async fn delete(&self, path: &str) -> Result<(), ConsoleError> {
        let response = self.client.delete(self.url(path)).send().await?;
        self.handle_ack(response).await
    }

    /// Handle a response whose payload lives in the envelope's `data` field.
    async fn handle_response<T: DeserializeOwned + Default>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ConsoleError> {
        let status = response.status();
        if !status.is_success() {
            return self.handle_error(response).await;
        }

        let body = response.text().await?;
        let envelope: Envelope<T> = serde_json::from_str(&body)?;
        if envelope.success == Some(false) {
            return Err(ConsoleError::api(
                status.as_u16(),
                envelope
                    .message
                    .unwrap_or_else(|| "Request failed".to_string()),
            ));
        }
        envelope.data.ok_or_else(|| {
            ConsoleError::api(status.as_u16(), "Response is missing its data payload")
        })
    }

    /// Handle a mutation response where only the acknowledgement matters.
    async fn handle_ack(&self, response: reqwest::Response) -> Result<(), ConsoleError> {
        let status = response.status();
        if !status.is_success() {
            return self.handle_error(response).await;
        }

        // Some endpoints report failure inside a 2xx body.
        let body = response.text().await?;
        if let Ok(ack) = serde_json::from_str::<Envelope<serde_json::Value>>(&body) {
            if ack.success == Some(false) {
                return Err(ConsoleError::api(
                    status.as_u16(),
                    ack.message.unwrap_or_else(|| "Request failed".to_string()),
                ));
            }
        }
        Ok(())
    }

    /// Handle an error response.
    async fn handle_error<T>(&self, response: reqwest::Response) -> Result<T, ConsoleError> {
        let status = response.status().as_u16();

        // Try to parse the error body; servers are not consistent about it
        let error_body: ApiErrorBody = response
            .json()
            .await
            .unwrap_or(ApiErrorBody { message: None });

        if status == 401 {
            return Err(ConsoleError::SessionExpired);
        }

        Err(ConsoleError::api(
            status,
            error_body
                .message
                .unwrap_or_else(|| "Unknown error".to_string()),
        ))
    }
}

/// Standard response envelope.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<T>,
}

/// API error response structure.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    admin: Option<AdminProfile>,
}

/// The admin profile returned on login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminProfile {
    #[serde(default)]
    pub username: String,
}

/// An authenticated session.
#[derive(Debug, Clone)]
pub struct LoginSession {
    pub token: String,
    pub admin: Option<AdminProfile>,
}

#[derive(Debug, Serialize)]
struct CreateVacancyBody<'a> {
    #[serde(flatten)]
    form: &'a VacancyForm,
    status: VacancyStatus,
}

#[derive(Debug, Serialize)]
struct FeaturedBody {
    featured: bool,
}

#[derive(Debug, Serialize)]
struct StatusBody<S: Serialize> {
    status: S,
}

/// Aggregate counts for the dashboard cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_students: usize,
    pub total_parents: usize,
    pub total_teachers: usize,
    pub pending_teachers: usize,
    pub approved_teachers: usize,
    pub rejected_teachers: usize,
}

impl DashboardStats {
    fn tally(
        students: &[StudentApplication],
        parents: &[ParentApplication],
        teachers: &[Teacher],
    ) -> Self {
        let count = |status: TeacherStatus| teachers.iter().filter(|t| t.status == status).count();
        DashboardStats {
            total_students: students.len(),
            total_parents: parents.len(),
            total_teachers: teachers.len(),
            pending_teachers: count(TeacherStatus::Pending),
            approved_teachers: count(TeacherStatus::Approved),
            rejected_teachers: count(TeacherStatus::Rejected),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_url_building() {
        let config = Config {
            api_url: "http://localhost:5000/api/".to_string(),
            ..Config::default()
        };
        let client = ApiClient::new(&config, None).unwrap();
        assert_eq!(
            client.url("/vacancies"),
            "http://localhost:5000/api/vacancies"
        );
    }

    #[test]
    fn test_create_vacancy_body_carries_open_status() {
        let form = VacancyForm {
            title: "Grade 8 Science".to_string(),
            subject: "Science".to_string(),
            description: String::new(),
            requirements: vec![],
            salary: "Rs. 25,000".to_string(),
            featured: false,
        };
        let body = serde_json::to_value(CreateVacancyBody {
            form: &form,
            status: VacancyStatus::Open,
        })
        .unwrap();
        assert_eq!(body["title"], "Grade 8 Science");
        assert_eq!(body["status"], "open");
    }

    #[test]
    fn test_status_body_serialization() {
        assert_eq!(
            serde_json::to_value(StatusBody {
                status: VacancyStatus::Closed
            })
            .unwrap(),
            json!({"status": "closed"})
        );
        assert_eq!(
            serde_json::to_value(StatusBody {
                status: ApplicationStatus::Accepted
            })
            .unwrap(),
            json!({"status": "accepted"})
        );
    }

    #[test]
    fn test_envelope_tolerates_missing_fields() {
        let envelope: Envelope<Vec<Vacancy>> = serde_json::from_str(r#"{"data": []}"#).unwrap();
        assert_eq!(envelope.success, None);
        assert!(envelope.data.unwrap().is_empty());
    }

    #[test]
    fn test_stats_tally() {
        let teachers: Vec<Teacher> = serde_json::from_value(json!([
            {"id": "t1", "status": "pending"},
            {"id": "t2", "status": "approved"},
            {"id": "t3", "status": "approved"},
            {"id": "t4", "status": "rejected"}
        ]))
        .unwrap();
        let stats = DashboardStats::tally(&[], &[], &teachers);
        assert_eq!(stats.total_teachers, 4);
        assert_eq!(stats.pending_teachers, 1);
        assert_eq!(stats.approved_teachers, 2);
        assert_eq!(stats.rejected_teachers, 1);
        assert_eq!(stats.total_students, 0);
    }
}
