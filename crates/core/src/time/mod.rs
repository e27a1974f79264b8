pub mod business_days;
