pub mod candidate_dto;
pub mod health_dto;
