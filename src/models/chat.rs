use serde::{Deserialize, Serialize};

use crate::models::course::CourseRef;

#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct CourseChatMessage {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct CourseChatRequest {
    pub messages: Vec<CourseChatMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct CourseChatResponse {
    pub response: String,
    pub model: String,
    pub course: CourseRef,
}
