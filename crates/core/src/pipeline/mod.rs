pub mod run_liveness_check_use_case;
