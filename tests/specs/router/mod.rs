mod dispatch_and_chain;
