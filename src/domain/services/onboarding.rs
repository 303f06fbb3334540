#[cfg(test)]
#[path = "onboarding_test.rs"]
mod tests;

use std::collections::HashMap;

use crate::domain::models::Answer;
use crate::domain::models::OnboardingQuestion;
use crate::domain::models::QuestionSet;
use crate::domain::models::QuestionType;

/// Clarifying questions held between the onboarding response and the user's
/// answers.
#[derive(Clone, Debug, PartialEq)]
pub struct OnboardingFlow {
    pub questions: Vec<OnboardingQuestion>,
    pub acknowledgment: String,
}

impl OnboardingFlow {
    pub fn new(set: &QuestionSet) -> OnboardingFlow {
        return OnboardingFlow {
            questions: set.questions.clone(),
            acknowledgment: set.acknowledgment.to_string(),
        };
    }

    /// Serializes answers as `question → answer` lines in question order.
    /// Unanswered and empty answers are dropped.
    pub fn serialize_answers(&self, answers: &HashMap<String, Answer>) -> String {
        return self
            .questions
            .iter()
            .filter_map(|question| {
                let rendered = answers.get(&question.id)?.render()?;
                return Some(format!("{} → {}", question.question.trim(), rendered));
            })
            .collect::<Vec<String>>()
            .join("\n");
    }

    /// Interprets a line of user input as an answer to `question`. Choice
    /// questions accept option numbers (`2` or `1,3`) or free text.
    pub fn parse_answer(question: &OnboardingQuestion, input: &str) -> Answer {
        let input = input.trim();
        let pick = |token: &str| -> String {
            if let Ok(idx) = token.trim().parse::<usize>() {
                if idx >= 1 && idx <= question.options.len() {
                    return question.options[idx - 1].to_string();
                }
            }
            return token.trim().to_string();
        };

        match question.qtype {
            QuestionType::Text => return Answer::Text(input.to_string()),
            QuestionType::Single => return Answer::Choice(pick(input)),
            QuestionType::Multi => {
                return Answer::Choices(
                    input
                        .split(',')
                        .map(pick)
                        .filter(|choice| return !choice.is_empty())
                        .collect(),
                )
            }
        }
    }
}
