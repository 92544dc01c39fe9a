pub mod db;
pub mod error;
pub mod fallback;
pub mod favorites;
pub mod meal_plan;
pub mod models;
pub mod pipeline;
pub mod router;
pub mod service;
pub mod shopping;
pub mod spoonacular;
pub mod storage;
