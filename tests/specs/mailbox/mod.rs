mod debounce_with_store;
