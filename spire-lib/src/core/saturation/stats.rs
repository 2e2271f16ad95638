/*!

Run statistics, printed at the end of a saturation run. The counters mirror what the
loop actually does, so a glance tells where the effort went.

*/

use std::fmt::Display;

#[derive(Clone, Default, Debug)]
pub struct Statistics {
  pub steps             : u64,
  pub generated         : u64,
  pub activated         : u64,
  pub trivial_discarded : u64,
  pub subsumed_forward  : u64,
  pub subsumed_backward : u64,
  pub demodulations     : u64,
  pub simplified_forward: u64,
  pub simplified_backward: u64,
  pub duplicates_dropped: u64,
  pub peak_passive      : usize,
  pub peak_active       : usize,
}

impl Statistics {
  pub fn record_passive_size(&mut self, size: usize) {
    self.peak_passive = self.peak_passive.max(size);
  }

  pub fn record_active_size(&mut self, size: usize) {
    self.peak_active = self.peak_active.max(size);
  }
}

impl Display for Statistics {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    writeln!(f, "steps                {}", self.steps)?;
    writeln!(f, "generated            {}", self.generated)?;
    writeln!(f, "activated            {}", self.activated)?;
    writeln!(f, "trivial discarded    {}", self.trivial_discarded)?;
    writeln!(f, "subsumed forward     {}", self.subsumed_forward)?;
    writeln!(f, "subsumed backward    {}", self.subsumed_backward)?;
    writeln!(f, "demodulations        {}", self.demodulations)?;
    writeln!(f, "simplified forward   {}", self.simplified_forward)?;
    writeln!(f, "simplified backward  {}", self.simplified_backward)?;
    writeln!(f, "duplicates dropped   {}", self.duplicates_dropped)?;
    writeln!(f, "peak passive         {}", self.peak_passive)?;
    write!(f,   "peak active          {}", self.peak_active)
  }
}
