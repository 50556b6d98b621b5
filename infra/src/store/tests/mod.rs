mod redis_attempt_store_tests;
