use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::Question;

/// Number of questions drawn for each quiz.
pub const SAMPLE_SIZE: usize = 3;

pub fn default_pool() -> Vec<Question> {
    vec![
        Question::new(
            1,
            "What is the capital of France?",
            ["London", "Berlin", "Paris", "Madrid"],
            2,
        ),
        Question::new(
            2,
            "Which planet is known as the Red Planet?",
            ["Venus", "Mars", "Jupiter", "Saturn"],
            1,
        ),
        Question::new(3, "What is 2 + 2?", ["3", "4", "5", "6"], 1),
        Question::new(
            4,
            "Who wrote 'Romeo and Juliet'?",
            [
                "Charles Dickens",
                "William Shakespeare",
                "Jane Austen",
                "Mark Twain",
            ],
            1,
        ),
        Question::new(
            5,
            "What is the largest ocean on Earth?",
            [
                "Atlantic Ocean",
                "Indian Ocean",
                "Arctic Ocean",
                "Pacific Ocean",
            ],
            3,
        ),
        Question::new(
            6,
            "Which programming language is known as the language of the web?",
            ["Python", "Java", "JavaScript", "C++"],
            2,
        ),
        Question::new(7, "What is the smallest prime number?", ["0", "1", "2", "3"], 2),
        Question::new(
            8,
            "Which animal is known as the King of the Jungle?",
            ["Tiger", "Lion", "Elephant", "Bear"],
            1,
        ),
        Question::new(
            9,
            "What is the chemical symbol for water?",
            ["H2O", "CO2", "O2", "NaCl"],
            0,
        ),
        Question::new(
            10,
            "Which year did World War II end?",
            ["1943", "1944", "1945", "1946"],
            2,
        ),
        Question::new(
            11,
            "What is the speed of light in vacuum?",
            ["300,000 km/s", "150,000 km/s", "450,000 km/s", "600,000 km/s"],
            0,
        ),
        Question::new(
            12,
            "Which continent is the largest?",
            ["Africa", "Asia", "North America", "Europe"],
            1,
        ),
    ]
}

/// Draws `count` distinct questions in random order.
///
/// Returns every question (shuffled) when the pool is smaller than `count`,
/// so a small pool gives a shorter quiz. Only an empty sample leaves a quiz loading.
pub fn sample<R: Rng + ?Sized>(pool: &[Question], count: usize, rng: &mut R) -> Vec<Question> {
    let mut shuffled = pool.to_vec();
    shuffled.shuffle(rng);
    shuffled.truncate(count);
    shuffled
}

/// Replaces the question sharing `updated.id`. Unknown ids leave the pool as is.
pub fn update_question(pool: &[Question], updated: &Question) -> Vec<Question> {
    pool.iter()
        .map(|q| {
            if q.id == updated.id {
                updated.clone()
            } else {
                q.clone()
            }
        })
        .collect()
}

pub fn find(pool: &[Question], id: i64) -> Option<&Question> {
    pool.iter().find(|q| q.id == id)
}
