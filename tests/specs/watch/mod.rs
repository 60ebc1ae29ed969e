mod issue_stage_change;
mod memo_threshold;
