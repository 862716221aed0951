//! Picks the next question of a quiz round.
//!
//! A round is not stored anywhere: the caller sends the category filter and
//! every question id it has already been shown, and gets back either a fresh
//! question or [`Selection::RoundComplete`].

use std::collections::HashSet;
use std::future::Future;

use rand::seq::IndexedRandom;
use rand::Rng;
use sqlx::SqlitePool;

use crate::db::queries::questions::{get_all_questions, get_questions_for_category};
use crate::db::Question;
use crate::telemetry::{QUESTIONS_SERVED, ROUNDS_COMPLETED};

/// Which questions take part in a round. On the wire `0` means any category.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CategoryFilter {
    Any,
    Category(i64),
}

impl From<i64> for CategoryFilter {
    fn from(id: i64) -> Self {
        match id {
            0 => CategoryFilter::Any,
            id => CategoryFilter::Category(id),
        }
    }
}

impl From<CategoryFilter> for i64 {
    fn from(filter: CategoryFilter) -> Self {
        match filter {
            CategoryFilter::Any => 0,
            CategoryFilter::Category(id) => id,
        }
    }
}

impl CategoryFilter {
    fn label(&self) -> String {
        match self {
            CategoryFilter::Any => "any".to_owned(),
            CategoryFilter::Category(id) => id.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Next(Question),
    RoundComplete,
}

impl Selection {
    pub fn into_question(self) -> Option<Question> {
        match self {
            Selection::Next(question) => Some(question),
            Selection::RoundComplete => None,
        }
    }
}

/// Where the eligible questions of a round come from.
pub trait QuestionSource {
    fn eligible_questions(
        &self,
        filter: CategoryFilter,
    ) -> impl Future<Output = sqlx::Result<Vec<Question>>> + Send;
}

impl QuestionSource for SqlitePool {
    async fn eligible_questions(&self, filter: CategoryFilter) -> sqlx::Result<Vec<Question>> {
        match filter {
            CategoryFilter::Any => get_all_questions(self).await,
            // an unknown category simply matches nothing
            CategoryFilter::Category(id) => get_questions_for_category(self, id).await,
        }
    }
}

impl QuestionSource for Vec<Question> {
    async fn eligible_questions(&self, filter: CategoryFilter) -> sqlx::Result<Vec<Question>> {
        Ok(self
            .iter()
            .filter(|q| match filter {
                CategoryFilter::Any => true,
                CategoryFilter::Category(id) => q.category == id,
            })
            .cloned()
            .collect())
    }
}

pub struct QuizSelector<S> {
    source: S,
}

impl<S: QuestionSource> QuizSelector<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub async fn next_question<R: Rng + ?Sized>(
        &self,
        filter: CategoryFilter,
        previously_asked: &HashSet<i64>,
        rng: &mut R,
    ) -> sqlx::Result<Selection> {
        let eligible = self.source.eligible_questions(filter).await?;
        let total = eligible.len();
        let selection = choose_unasked(eligible, previously_asked, rng);
        match &selection {
            Selection::Next(question) => {
                tracing::debug!(
                    question = question.id,
                    ?filter,
                    asked = previously_asked.len(),
                    total,
                    "Serving quiz question"
                );
                let label = filter.label();
                QUESTIONS_SERVED.with_label_values(&[label.as_str()]).inc();
            }
            Selection::RoundComplete => {
                tracing::debug!(?filter, total, "Quiz round complete");
                ROUNDS_COMPLETED.inc();
            }
        }
        Ok(selection)
    }
}

/// Uniformly picks one of `eligible` whose id is not in `previously_asked`.
pub fn choose_unasked<R: Rng + ?Sized>(
    eligible: Vec<Question>,
    previously_asked: &HashSet<i64>,
    rng: &mut R,
) -> Selection {
    let remaining: Vec<Question> = eligible
        .into_iter()
        .filter(|q| !previously_asked.contains(&q.id))
        .collect();
    match remaining.choose(rng) {
        Some(question) => Selection::Next(question.clone()),
        None => Selection::RoundComplete,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn question(id: i64, category: i64) -> Question {
        Question {
            id,
            question: format!("question {id}"),
            answer: format!("answer {id}"),
            category,
            difficulty: 1,
        }
    }

    fn store() -> Vec<Question> {
        vec![
            question(1, 1),
            question(2, 1),
            question(3, 2),
            question(4, 2),
            question(5, 3),
        ]
    }

    fn asked(ids: &[i64]) -> HashSet<i64> {
        ids.iter().copied().collect()
    }

    #[test]
    fn wire_zero_means_any_category() {
        assert_eq!(CategoryFilter::from(0), CategoryFilter::Any);
        assert_eq!(CategoryFilter::from(4), CategoryFilter::Category(4));
        assert_eq!(i64::from(CategoryFilter::Any), 0);
    }

    #[test]
    fn exhausted_round_is_complete() {
        let mut rng = StdRng::seed_from_u64(7);
        let selection = choose_unasked(store(), &asked(&[1, 2, 3, 4, 5]), &mut rng);
        assert_eq!(selection, Selection::RoundComplete);
    }

    #[test]
    fn repeated_history_ids_still_exhaust_the_round() {
        let mut rng = StdRng::seed_from_u64(5);
        let history = asked(&[1, 1, 2, 2, 3, 3, 4, 4, 5, 5]);
        assert_eq!(history.len(), 5);
        assert_eq!(
            choose_unasked(store(), &history, &mut rng),
            Selection::RoundComplete
        );
    }

    #[test]
    fn empty_store_is_complete() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(
            choose_unasked(Vec::new(), &HashSet::new(), &mut rng),
            Selection::RoundComplete
        );
    }

    #[test]
    fn only_the_unasked_question_is_picked() {
        for seed in 0..32 {
            let mut rng = StdRng::seed_from_u64(seed);
            let selection = choose_unasked(store(), &asked(&[1, 2, 3, 5]), &mut rng);
            assert_eq!(selection.into_question().map(|q| q.id), Some(4));
        }
    }

    #[test]
    fn ids_outside_the_eligible_set_do_not_matter() {
        let mut rng = StdRng::seed_from_u64(3);
        let selection = choose_unasked(vec![question(1, 1)], &asked(&[42, 43]), &mut rng);
        assert_eq!(selection.into_question().map(|q| q.id), Some(1));
    }

    #[test]
    fn every_remaining_question_can_be_picked() {
        let mut seen = HashSet::new();
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            if let Selection::Next(q) = choose_unasked(store(), &asked(&[2]), &mut rng) {
                seen.insert(q.id);
            }
        }
        assert_eq!(seen, asked(&[1, 3, 4, 5]));
    }

    #[tokio::test]
    async fn selection_respects_category_filter() {
        let selector = QuizSelector::new(store());
        for seed in 0..32 {
            let mut rng = StdRng::seed_from_u64(seed);
            let question = selector
                .next_question(CategoryFilter::Category(2), &HashSet::new(), &mut rng)
                .await
                .unwrap()
                .into_question()
                .unwrap();
            assert_eq!(question.category, 2);
        }
    }

    #[tokio::test]
    async fn unknown_category_completes_immediately() {
        let selector = QuizSelector::new(store());
        let mut rng = StdRng::seed_from_u64(1);
        let selection = selector
            .next_question(CategoryFilter::Category(99), &HashSet::new(), &mut rng)
            .await
            .unwrap();
        assert_eq!(selection, Selection::RoundComplete);
    }

    #[tokio::test]
    async fn round_terminates_without_repeats() {
        let selector = QuizSelector::new(store());
        let mut rng = StdRng::seed_from_u64(11);
        let mut history = HashSet::new();

        for _ in 0..store().len() {
            let question = selector
                .next_question(CategoryFilter::Any, &history, &mut rng)
                .await
                .unwrap()
                .into_question()
                .unwrap();
            assert!(history.insert(question.id), "question {} repeated", question.id);
        }

        let last = selector
            .next_question(CategoryFilter::Any, &history, &mut rng)
            .await
            .unwrap();
        assert_eq!(last, Selection::RoundComplete);
    }
}
