use anchor_lang::prelude::*;

#[error_code]
pub enum SchedulerError {
    // ── Authorization errors ──
    #[msg("Only the scheduler admin can perform this action")]
    Unauthorized,

    #[msg("Queue authority is not registered on this task queue")]
    UnauthorizedSubmitter,

    #[msg("Oracle callback was not signed by the oracle identity")]
    UnauthorizedCallback,

    #[msg("Stored bump does not derive a valid authority")]
    InvalidAuthority,

    // ── Configuration errors ──
    #[msg("Scheduler is currently paused")]
    SchedulerPaused,

    #[msg("Task queue does not match the scheduler config")]
    InvalidTaskQueue,

    #[msg("Queue program does not match the scheduler config")]
    InvalidQueueProgram,

    #[msg("Oracle program does not match the scheduler config")]
    InvalidOracleProgram,

    #[msg("Treasury account does not match the job")]
    InvalidTreasury,

    #[msg("Mint does not match the job")]
    InvalidMint,

    #[msg("Maximum chain age cannot be negative")]
    InvalidChainAge,

    // ── Fee errors ──
    #[msg("Transfer fee basis points exceed 10000")]
    FeeRateTooHigh,

    #[msg("Mint has no transfer fee configuration")]
    MissingFeeConfig,

    #[msg("Mint withdraw authority is not the fee authority")]
    FeeAuthorityMismatch,

    #[msg("Withheld fees moved by a different amount than planned")]
    HarvestMismatch,

    // ── Registration and funding errors ──
    #[msg("Queue authority is already registered on this task queue")]
    AlreadyRegistered,

    #[msg("Queue authority balance is below the funding threshold")]
    InsufficientFunding,

    // ── Task errors ──
    #[msg("Task id is already live on the task queue")]
    DuplicateTaskId,

    #[msg("Task account does not match the task id")]
    TaskAccountMismatch,

    #[msg("Compute budget is below the payload's worst-case cost")]
    InsufficientCompute,

    #[msg("Task queue has no free capacity")]
    QueueCapacityExceeded,

    #[msg("Transaction could not be compiled for the task queue")]
    CompileTransactionFailed,

    #[msg("Task trigger time has not been reached")]
    TriggerNotReached,

    // ── Job errors ──
    #[msg("Job already has a pending task")]
    JobAlreadyScheduled,

    #[msg("Job has been cancelled")]
    JobCancelled,

    #[msg("Job interval cannot be negative")]
    InvalidInterval,

    #[msg("Job kind does not support this instruction")]
    JobKindMismatch,

    #[msg("Too many source accounts for one job")]
    TooManySources,

    #[msg("Source accounts do not match the job")]
    SourceMismatch,


    // ── Oracle errors ──
    #[msg("Oracle query exceeds the maximum length")]
    QueryTooLong,
    #[msg("Interaction or context account does not belong to this job")]
    OracleAccountMismatch,

    // ── Arithmetic errors ──
    #[msg("Arithmetic overflow")]
    Overflow,
}
