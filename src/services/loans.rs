//! Loan renewal service

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        loan::{RenewalForm, RenewalOutcome, RenewalPolicy, RenewalSubmission},
        today,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
    policy: RenewalPolicy,
}

impl LoansService {
    pub fn new(repository: Repository, policy: RenewalPolicy) -> Self {
        Self { repository, policy }
    }

    /// Form pre-filled with the proposed date
    pub async fn renewal_form(&self, instance_id: Uuid) -> AppResult<RenewalForm> {
        let instance = self.repository.instances.find_by_id(instance_id).await?;
        Ok(RenewalForm::fresh(instance, &self.policy, today()))
    }

    /// Validate a submitted date and persist it when acceptable
    pub async fn renew(
        &self,
        instance_id: Uuid,
        submission: &RenewalSubmission,
    ) -> AppResult<RenewalOutcome> {
        self.renew_on(instance_id, submission, today()).await
    }

    async fn renew_on(
        &self,
        instance_id: Uuid,
        submission: &RenewalSubmission,
        today: NaiveDate,
    ) -> AppResult<RenewalOutcome> {
        let instance = self.repository.instances.find_by_id(instance_id).await?;

        match self.policy.validate(&submission.renewal_date, today) {
            Ok(due_back) => {
                let renewed = self
                    .repository
                    .instances
                    .update_due_back(instance.id, due_back)
                    .await?;
                tracing::info!("Renewed book instance {} until {}", renewed.id, due_back);
                Ok(RenewalOutcome::Applied(renewed))
            }
            Err(error) => {
                tracing::debug!(
                    "Rejected renewal of {} to {:?}: {}",
                    instance.id,
                    submission.renewal_date,
                    error
                );
                Ok(RenewalOutcome::Rejected(RenewalForm::rejected(
                    instance,
                    &self.policy,
                    submission,
                    error,
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::AppError,
        models::{BookInstance, LoanStatus},
        repository::testing::MockRepository,
    };
    use mockall::predicate::eq;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
    }

    fn on_loan(id: Uuid) -> BookInstance {
        BookInstance {
            id,
            book_id: Some(1),
            imprint: "Penguin, 1999".to_string(),
            due_back: Some(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()),
            borrower_id: Some(7),
            status: LoanStatus::OnLoan,
        }
    }

    fn submission(date: &str) -> RenewalSubmission {
        RenewalSubmission {
            renewal_date: date.to_string(),
        }
    }

    #[tokio::test]
    async fn test_valid_date_is_applied_once() {
        let id = Uuid::new_v4();
        let new_date = NaiveDate::from_ymd_opt(2024, 5, 31).unwrap();
        let mut repo = MockRepository::default();
        repo.instances
            .expect_find_by_id()
            .returning(|id| Ok(on_loan(id)));
        repo.instances
            .expect_update_due_back()
            .with(eq(id), eq(new_date))
            .times(1)
            .returning(|id, date| {
                Ok(BookInstance {
                    due_back: Some(date),
                    ..on_loan(id)
                })
            });

        let service = LoansService::new(repo.build(), RenewalPolicy::default());
        let outcome = service
            .renew_on(id, &submission("2024-05-31"), day())
            .await
            .unwrap();

        match outcome {
            RenewalOutcome::Applied(instance) => {
                assert_eq!(instance.due_back, Some(new_date));
                assert_eq!(instance.status, LoanStatus::OnLoan);
                assert_eq!(instance.borrower_id, Some(7));
            }
            RenewalOutcome::Rejected(form) => panic!("unexpected rejection: {:?}", form.errors),
        }
    }

    #[tokio::test]
    async fn test_past_date_writes_nothing() {
        let mut repo = MockRepository::default();
        repo.instances
            .expect_find_by_id()
            .returning(|id| Ok(on_loan(id)));
        repo.instances.expect_update_due_back().times(0);

        let service = LoansService::new(repo.build(), RenewalPolicy::default());
        let outcome = service
            .renew_on(Uuid::new_v4(), &submission("2024-05-09"), day())
            .await
            .unwrap();

        let RenewalOutcome::Rejected(form) = outcome else {
            panic!("past date must be rejected");
        };
        assert_eq!(form.errors, vec!["Invalid date - renewal in past".to_string()]);
        assert_eq!(form.renewal_date, "2024-05-09");
    }

    #[tokio::test]
    async fn test_date_beyond_four_weeks_rejected() {
        let mut repo = MockRepository::default();
        repo.instances
            .expect_find_by_id()
            .returning(|id| Ok(on_loan(id)));
        repo.instances.expect_update_due_back().times(0);

        let service = LoansService::new(repo.build(), RenewalPolicy::default());
        let outcome = service
            .renew_on(Uuid::new_v4(), &submission("2024-06-08"), day())
            .await
            .unwrap();

        assert!(matches!(outcome, RenewalOutcome::Rejected(_)));
    }

    #[tokio::test]
    async fn test_unknown_copy_is_not_found() {
        let mut repo = MockRepository::default();
        repo.instances
            .expect_find_by_id()
            .returning(|id| Err(AppError::NotFound(format!("Book instance {} not found", id))));
        repo.instances.expect_update_due_back().times(0);

        let service = LoansService::new(repo.build(), RenewalPolicy::default());
        let err = service
            .renew(Uuid::new_v4(), &submission("2024-05-31"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_fresh_form_proposes_three_weeks() {
        let mut repo = MockRepository::default();
        repo.instances
            .expect_find_by_id()
            .returning(|id| Ok(on_loan(id)));

        let service = LoansService::new(repo.build(), RenewalPolicy::default());
        let form = service.renewal_form(Uuid::new_v4()).await.unwrap();

        let expected = RenewalPolicy::default().proposed_date(today());
        assert_eq!(form.renewal_date, expected.format("%Y-%m-%d").to_string());
        assert!(form.errors.is_empty());
    }
}
