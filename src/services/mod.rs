pub mod candidate_service;
