use crate::model::{Category, Difficulty, Question};

/// Questions grouped by category and difficulty.
///
/// Every category has a bucket for every difficulty, possibly empty. The index is
/// built once and only read afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionIndex {
    buckets: [[Vec<Question>; 3]; 10],
}

impl QuestionIndex {
    /// An index with all buckets present and empty.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Group questions into their buckets, preserving input order within each.
    #[must_use]
    pub fn from_questions(questions: impl IntoIterator<Item = Question>) -> Self {
        let mut index = Self::empty();
        for question in questions {
            index.buckets[question.category().index()][question.difficulty().index()]
                .push(question);
        }
        index
    }

    /// Questions of one category at one difficulty.
    #[must_use]
    pub fn pool(&self, category: Category, difficulty: Difficulty) -> &[Question] {
        &self.buckets[category.index()][difficulty.index()]
    }

    /// All questions of a category, easy then medium then hard.
    pub fn category_questions(&self, category: Category) -> impl Iterator<Item = &Question> {
        self.buckets[category.index()].iter().flatten()
    }

    #[must_use]
    pub fn category_total(&self, category: Category) -> usize {
        self.buckets[category.index()].iter().map(Vec::len).sum()
    }

    #[must_use]
    pub fn difficulty_total(&self, difficulty: Difficulty) -> usize {
        Category::ALL
            .iter()
            .map(|c| self.pool(*c, difficulty).len())
            .sum()
    }

    /// Every question, in catalog order then difficulty order.
    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.buckets.iter().flatten().flatten()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.iter().flatten().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
