use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use std::collections::HashSet;

use quiz_core::model::{
    Category, ComposerSettings, Difficulty, Exam, ExamError, ExamSpec, Question, QuestionIndex,
};

/// Builds exams from the question index according to an `ExamSpec`.
///
/// Every strategy is a small function from (index, limits, rng) to a question
/// list; `compose` dispatches on the `ExamSpec` and turns an empty or undersized list
/// into an `ExamError`.
#[derive(Debug, Clone, Default)]
pub struct ExamComposer {
    settings: ComposerSettings,
}

impl ExamComposer {
    #[must_use]
    pub fn new(settings: ComposerSettings) -> Self {
        Self { settings }
    }

    #[must_use]
    pub fn settings(&self) -> &ComposerSettings {
        &self.settings
    }

    /// Compose an exam using the thread-local RNG.
    ///
    /// # Errors
    ///
    /// See [`ExamComposer::compose_with_rng`].
    pub fn compose(&self, index: &QuestionIndex, spec: ExamSpec) -> Result<Exam, ExamError> {
        self.compose_with_rng(index, spec, &mut rand::rng())
    }

    /// Compose an exam with a caller-provided RNG.
    ///
    /// # Errors
    ///
    /// Returns `ExamError::NoQuestions` when the strategy selects nothing, and
    /// `ExamError::TooFewQuestions` when a quick quiz or balanced exam cannot reach
    /// its required size.
    pub fn compose_with_rng<R: Rng + ?Sized>(
        &self,
        index: &QuestionIndex,
        spec: ExamSpec,
        rng: &mut R,
    ) -> Result<Exam, ExamError> {
        let s = &self.settings;
        let questions = match spec {
            ExamSpec::ByDifficulty { difficulty } => {
                by_difficulty(index, difficulty, s.per_category(), rng)
            }
            ExamSpec::ByCategory { category } => {
                by_category(index, category, s.category_limit(), rng)
            }
            ExamSpec::Balanced { .. } => {
                let questions = balanced(
                    index,
                    s.per_category(),
                    s.balanced_per_difficulty(),
                    rng,
                );
                require(spec, s.balanced_minimum(), questions.len())?;
                questions
            }
            ExamSpec::SuperHard => {
                by_difficulty(index, Difficulty::Hard, s.super_hard_per_category(), rng)
            }
            ExamSpec::Quick => {
                require(spec, s.quick_size(), index.len())?;
                random_sample(index, s.quick_size(), rng)
            }
            ExamSpec::RandomMix => random_sample(index, s.random_mix_size(), rng),
        };

        Exam::new(spec, dedupe(questions))
    }
}

fn require(spec: ExamSpec, required: usize, available: usize) -> Result<(), ExamError> {
    if available == 0 {
        return Err(ExamError::NoQuestions {
            label: spec.label(),
        });
    }
    if available < required {
        return Err(ExamError::TooFewQuestions {
            label: spec.label(),
            required,
            available,
        });
    }
    Ok(())
}

/// Up to `n` questions drawn without replacement.
fn sample<'a, R: Rng + ?Sized>(
    pool: impl IntoIterator<Item = &'a Question>,
    n: usize,
    rng: &mut R,
) -> Vec<Question> {
    let pool: Vec<&Question> = pool.into_iter().collect();
    let take = n.min(pool.len());
    pool.choose_multiple(rng, take)
        .map(|q| (*q).clone())
        .collect()
}

/// Up to `per_category` questions from each category at one difficulty, unshuffled.
fn per_category_draw<R: Rng + ?Sized>(
    index: &QuestionIndex,
    difficulty: Difficulty,
    per_category: usize,
    rng: &mut R,
) -> Vec<Question> {
    let mut drawn = Vec::new();
    for category in Category::ALL {
        drawn.extend(sample(index.pool(category, difficulty), per_category, rng));
    }
    drawn
}

fn by_difficulty<R: Rng + ?Sized>(
    index: &QuestionIndex,
    difficulty: Difficulty,
    per_category: usize,
    rng: &mut R,
) -> Vec<Question> {
    let mut questions = per_category_draw(index, difficulty, per_category, rng);
    questions.shuffle(rng);
    questions
}

fn by_category<R: Rng + ?Sized>(
    index: &QuestionIndex,
    category: Category,
    limit: usize,
    rng: &mut R,
) -> Vec<Question> {
    let mut questions: Vec<Question> = index.category_questions(category).cloned().collect();
    questions.shuffle(rng);
    questions.truncate(limit);
    questions
}

fn balanced<R: Rng + ?Sized>(
    index: &QuestionIndex,
    per_category: usize,
    per_difficulty: usize,
    rng: &mut R,
) -> Vec<Question> {
    let mut questions = Vec::new();
    for difficulty in Difficulty::ALL {
        let pooled = per_category_draw(index, difficulty, per_category, rng);
        questions.extend(sample(&pooled, per_difficulty, rng));
    }
    questions.shuffle(rng);
    questions
}

fn random_sample<R: Rng + ?Sized>(
    index: &QuestionIndex,
    n: usize,
    rng: &mut R,
) -> Vec<Question> {
    let mut questions = sample(index.iter(), n, rng);
    questions.shuffle(rng);
    questions
}

/// Drop repeated questions, keeping the first occurrence.
fn dedupe(questions: Vec<Question>) -> Vec<Question> {
    let mut seen = HashSet::with_capacity(questions.len());
    questions.into_iter().filter(|q| seen.insert(q.id())).collect()
}
