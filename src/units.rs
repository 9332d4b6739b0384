#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct Width(pub u32);
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct Height(pub u32);

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct RowIndex(pub u32);
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct ColumnIndex(pub u32);
